//! List command implementation.

use std::io::Write;

use anyhow::{Context, Result};
use homesens_core::SensorBackend;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_sensor_list_json, format_sensor_list_text};

/// Print the sensors the backend can see.
pub fn cmd_list<B: SensorBackend + ?Sized>(
    sensors: &B,
    format: OutputFormat,
    opts: &FormatOptions,
    out: &mut impl Write,
) -> Result<()> {
    let list = sensors.list().context("Failed to list sensors")?;
    tracing::debug!(count = list.len(), "sensors listed");

    let content = match format {
        OutputFormat::Json => format_sensor_list_json(&list, opts)?,
        OutputFormat::Text => format_sensor_list_text(&list),
    };
    out.write_all(content.as_bytes())
        .context("Failed to write output")?;
    Ok(())
}
