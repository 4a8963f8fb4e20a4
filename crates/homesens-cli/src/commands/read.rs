//! Read command implementation.

use std::io::Write;

use anyhow::{Context, Result};
use homesens_core::{JsonTransport, RadiationResult, SensorBackend, UradmonClient};

use crate::cli::OutputFormat;
use crate::config::RunConfig;
use crate::format::{FormatOptions, format_report_json, format_report_text};

/// Read the local sensor, then uRadMonitor if enabled, and print both.
///
/// `transport` is only called when uRadMonitor is enabled. Nothing is
/// written to `out` unless every step succeeds.
pub async fn cmd_read<B, T, F>(
    sensors: &B,
    transport: F,
    run: &RunConfig,
    out: &mut impl Write,
) -> Result<()>
where
    B: SensorBackend + ?Sized,
    T: JsonTransport,
    F: FnOnce() -> RadiationResult<T>,
{
    let reading = sensors
        .read(run.sensor, &run.temperature_leaf, &run.humidity_leaf)
        .with_context(|| format!("Failed to read sensor {}", run.sensor))?;

    let radiation = match &run.uradmon {
        Some(uradmon) => {
            let transport = transport().context("Failed to set up HTTP client")?;
            let client = UradmonClient::with_transport(
                transport,
                uradmon.credentials.clone(),
                &uradmon.api_url,
            )?;
            let radiation = client
                .fetch()
                .await
                .context("Failed to fetch uRadMonitor data")?;
            Some(radiation)
        }
        None => {
            tracing::debug!("uRadMonitor disabled, skipping remote call");
            None
        }
    };

    let opts = FormatOptions::new(run.no_color);
    let content = match run.format {
        OutputFormat::Json => format_report_json(&reading, radiation.as_ref(), &opts)?,
        OutputFormat::Text => format_report_text(
            &reading,
            radiation.as_ref(),
            run.uradmon.is_some(),
            &opts,
        ),
    };
    out.write_all(content.as_bytes())
        .context("Failed to write output")?;
    Ok(())
}
