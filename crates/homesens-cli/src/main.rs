use std::{env, io};

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use homesens_cli::cli::{Cli, help_requested};
use homesens_cli::commands::{cmd_list, cmd_read};
use homesens_cli::config::{Config, RunConfig, SensorSource};
use homesens_cli::format::FormatOptions;
use homesens_core::{HttpTransport, IioBackend, SensorBackend, default_backend};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    if help_requested(env::args_os()) {
        Cli::command().print_help()?;
        return Ok(());
    }
    let cli = Cli::parse();

    // stdout carries the report, so logs go to stderr
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let run = match RunConfig::resolve(&cli, &config) {
        Ok(run) => run,
        Err(e) => Cli::command().error(e.kind(), e).exit(),
    };

    let sensors: Box<dyn SensorBackend> = match &run.sensor_source {
        SensorSource::Iio(root) => Box::new(IioBackend::new(root)),
        SensorSource::Platform => default_backend(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if run.list_sensors {
        let opts = FormatOptions::new(run.no_color);
        return cmd_list(&sensors, run.format, &opts, &mut out);
    }

    cmd_read(&sensors, HttpTransport::new, &run, &mut out).await
}
