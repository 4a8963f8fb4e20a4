//! CLI argument definitions using clap.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{Arg, CommandFactory, Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use homesens_core::validation::{is_valid_credential, parse_api_url};

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "homesens")]
#[command(
    author,
    version,
    about = "Display DHT temperature/humidity and uRadMonitor radiation readings",
    long_about = None,
    after_help = "Unless -U/--no-uradmon is given, --uradmon-id, --uradmon-userid and \
                  --uradmon-userkey are mandatory."
)]
pub struct Cli {
    /// List sensors detected
    #[arg(short = 'l', long = "list-sensors", visible_alias = "list")]
    pub list_sensors: bool,

    /// Use sensor number N [default: 0]
    #[arg(short = 's', long = "sensor", value_name = "N")]
    pub sensor: Option<u32>,

    /// Use LEAFOID for temperature reading [default: temperature]
    #[arg(short = 'T', value_name = "LEAFOID")]
    pub temperature_leaf: Option<String>,

    /// Use LEAFOID for humidity reading [default: humidity]
    #[arg(short = 'H', value_name = "LEAFOID")]
    pub humidity_leaf: Option<String>,

    /// Do not query and display uRadMonitor data
    #[arg(short = 'U', long = "no-uradmon")]
    pub no_uradmon: bool,

    /// uRadMonitor device ID
    #[arg(
        long = "uradmon-id",
        value_name = "ID",
        env = "HOMESENS_URADMON_ID",
        value_parser = parse_credential
    )]
    pub uradmon_id: Option<String>,

    /// uRadMonitor user ID
    #[arg(
        long = "uradmon-userid",
        value_name = "USERID",
        env = "HOMESENS_URADMON_USERID",
        value_parser = parse_credential
    )]
    pub uradmon_userid: Option<String>,

    /// uRadMonitor user auth key
    #[arg(
        long = "uradmon-userkey",
        value_name = "USERKEY",
        env = "HOMESENS_URADMON_USERKEY",
        hide_env_values = true,
        value_parser = parse_credential
    )]
    pub uradmon_userkey: Option<String>,

    /// uRadMonitor API URL [default: https://data.uradmonitor.com/api/v1/devices]
    #[arg(
        long = "uradmon-api",
        value_name = "URL",
        env = "HOMESENS_URADMON_API",
        value_parser = parse_url
    )]
    pub uradmon_api: Option<String>,

    /// Output format [default: text]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,

    /// Read sensors from the Linux IIO sysfs tree at DIR
    #[arg(long, value_name = "DIR", env = "HOMESENS_IIO_ROOT")]
    pub iio_root: Option<PathBuf>,

    /// Configuration file [default: <config dir>/homesens/config.toml]
    #[arg(long, value_name = "PATH", env = "HOMESENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// True when `-h`/`--help` appears anywhere before `--`.
///
/// clap stops at the first invalid value or unknown flag, so help has to be
/// found before parsing for it to win over everything else on the line.
/// Values of options that take one are skipped, so `-T h` is not help.
pub fn help_requested<I, T>(args: I) -> bool
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let command = Cli::command();
    let takes_value = |arg: Option<&Arg>| arg.is_some_and(|a| a.get_action().takes_values());

    let mut args = args.into_iter().skip(1).map(Into::into).peekable();
    while let Some(arg) = args.next() {
        let Some(arg) = arg.to_str() else {
            continue;
        };
        // a following token that looks like a flag is never taken as a value
        let next_is_value = |next: Option<&OsString>| {
            next.and_then(|n| n.to_str())
                .is_some_and(|n| n == "-" || !n.starts_with('-'))
        };

        if arg == "--" {
            return false;
        } else if let Some(long) = arg.strip_prefix("--") {
            if long == "help" {
                return true;
            }
            if long.contains('=') {
                continue;
            }
            let found = command.get_arguments().find(|a| a.get_long() == Some(long));
            if takes_value(found) && next_is_value(args.peek()) {
                args.next();
            }
        } else if let Some(shorts) = arg.strip_prefix('-') {
            for (i, c) in shorts.char_indices() {
                if c == 'h' {
                    return true;
                }
                let found = command.get_arguments().find(|a| a.get_short() == Some(c));
                if takes_value(found) {
                    // `-s1` carries its value inline
                    if i + c.len_utf8() == shorts.len() && next_is_value(args.peek()) {
                        args.next();
                    }
                    break;
                }
            }
        }
    }
    false
}

/// Accept device ids, user ids and keys made of letters, digits, `-` and `_`.
fn parse_credential(s: &str) -> Result<String, String> {
    if is_valid_credential(s) {
        Ok(s.to_string())
    } else {
        Err("only letters, digits, '-' and '_' are allowed".to_string())
    }
}

fn parse_url(s: &str) -> Result<String, String> {
    parse_api_url(s).map(|_| s.to_string())
}
