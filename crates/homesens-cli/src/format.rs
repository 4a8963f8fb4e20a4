//! Output formatting for text and JSON output.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

use homesens_types::{RadiationReading, SensorInfo, SensorReading};

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }

    /// Serialize value to pretty-printed JSON with a trailing newline.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)? + "\n")
    }

    fn value(&self, text: String) -> String {
        if self.no_color {
            text
        } else {
            format!("{}", text.bold())
        }
    }

    fn missing(&self) -> String {
        if self.no_color {
            "n/a".to_string()
        } else {
            format!("{}", "n/a".dimmed())
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("{}", text.red())
        }
    }
}

const RADIATION_LABEL: &str = "radiation";
const TUBE_LABEL: &str = "tube";

// ============================================================================
// Reading formatting
// ============================================================================

/// Format a sensor reading and the optional radiation reading as text.
///
/// `uradmon_enabled` decides whether a missing radiation reading is shown as
/// `uRadMonitor disabled`.
#[must_use]
pub fn format_report_text(
    reading: &SensorReading,
    radiation: Option<&RadiationReading>,
    uradmon_enabled: bool,
    opts: &FormatOptions,
) -> String {
    let mut lines: Vec<(&str, String)> = vec![
        (
            reading.temperature_label.as_str(),
            reading
                .temperature
                .map(|t| opts.value(format!("{:.1} °C", t)))
                .unwrap_or_else(|| opts.missing()),
        ),
        (
            reading.humidity_label.as_str(),
            reading
                .humidity
                .map(|h| opts.value(format!("{:.1} %", h)))
                .unwrap_or_else(|| opts.missing()),
        ),
    ];

    if let Some(r) = radiation {
        let mut line = opts.value(r.to_string());
        if let Some(cpm) = r.cpm {
            line.push_str(&format!(" ({:.0} CPM)", cpm));
        }
        if !r.online {
            line.push(' ');
            line.push_str(&opts.warning("(offline)"));
        }
        lines.push((RADIATION_LABEL, line));

        if let Some(tube) = format_tube(r) {
            lines.push((TUBE_LABEL, tube));
        }
    }

    let width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
    let mut output = String::new();
    for (label, value) in &lines {
        output.push_str(&format!("{:<width$} {}\n", format!("{}:", label), value));
    }

    if radiation.is_none() && !uradmon_enabled {
        output.push_str("uRadMonitor disabled\n");
    }
    output
}

fn format_tube(r: &RadiationReading) -> Option<String> {
    match (r.voltage, r.duty) {
        (Some(v), Some(d)) => Some(format!("{:.0} V, duty {:.1} %", v, d)),
        (Some(v), None) => Some(format!("{:.0} V", v)),
        (None, Some(d)) => Some(format!("duty {:.1} %", d)),
        (None, None) => None,
    }
}

#[derive(Serialize)]
struct Report<'a> {
    sensor: &'a SensorReading,
    radiation: Option<&'a RadiationReading>,
}

/// Format a sensor reading and the optional radiation reading as JSON.
pub fn format_report_json(
    reading: &SensorReading,
    radiation: Option<&RadiationReading>,
    opts: &FormatOptions,
) -> Result<String> {
    opts.as_json(&Report {
        sensor: reading,
        radiation,
    })
}

// ============================================================================
// Sensor listing
// ============================================================================

#[must_use]
pub fn format_sensor_list_text(sensors: &[SensorInfo]) -> String {
    let mut output = format!("{:<4}{:<13}{}\n", "ID", "Driver", "Description");
    for sensor in sensors {
        output.push_str(&format!(
            "{:<4}{:<13}{}\n",
            sensor.index, sensor.driver, sensor.description
        ));
    }
    output
}

pub fn format_sensor_list_json(sensors: &[SensorInfo], opts: &FormatOptions) -> Result<String> {
    opts.as_json(&sensors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> FormatOptions {
        FormatOptions::new(true)
    }

    fn reading() -> SensorReading {
        SensorReading::new(0, "temperature", "humidity")
            .with_temperature(21.5)
            .with_humidity(40.0)
    }

    #[test]
    fn test_text_sensor_only_disabled() {
        let text = format_report_text(&reading(), None, false, &plain());
        assert_eq!(
            text,
            "temperature: 21.5 °C\nhumidity:    40.0 %\nuRadMonitor disabled\n"
        );
    }

    #[test]
    fn test_text_missing_value_is_na() {
        let reading = SensorReading::new(0, "temperature", "humidity").with_temperature(19.04);
        let text = format_report_text(&reading, None, false, &plain());
        assert!(text.contains("temperature: 19.0 °C"));
        assert!(text.contains("humidity:    n/a"));
    }

    #[test]
    fn test_text_uses_custom_labels() {
        let reading = SensorReading::new(1, "temp2", "hum2")
            .with_temperature(21.5)
            .with_humidity(40.0);
        let text = format_report_text(&reading, None, false, &plain());
        assert!(text.contains("temp2: 21.5 °C"));
        assert!(text.contains("hum2:  40.0 %"));
    }

    #[test]
    fn test_text_with_radiation_value() {
        let radiation = RadiationReading::new("82000001", 0.12);
        let text = format_report_text(&reading(), Some(&radiation), true, &plain());
        assert!(text.contains("radiation:   0.12 µSv/h\n"));
        assert!(!text.contains("disabled"));
        assert!(!text.contains("tube"));
    }

    #[test]
    fn test_text_with_full_radiation_record() {
        let mut radiation = RadiationReading::from_cpm("82000001", 18.0, 0.0065);
        radiation.voltage = Some(380.0);
        radiation.duty = Some(12.5);
        radiation.online = false;
        let text = format_report_text(&reading(), Some(&radiation), true, &plain());
        assert!(text.contains("radiation:   0.12 µSv/h (18 CPM) (offline)\n"));
        assert!(text.contains("tube:        380 V, duty 12.5 %\n"));
    }

    #[test]
    fn test_text_colored_keeps_values() {
        let text = format_report_text(&reading(), None, false, &FormatOptions::new(false));
        assert!(text.contains("21.5 °C"));
        assert!(text.contains("\u{1b}["));
    }

    #[test]
    fn test_json_report_shape() {
        let radiation = RadiationReading::new("82000001", 0.12);
        let json = format_report_json(&reading(), Some(&radiation), &plain()).unwrap();
        assert!(json.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["sensor"]["temperature"], 21.5);
        assert_eq!(value["sensor"]["humidity"], 40.0);
        assert_eq!(value["radiation"]["value"], 0.12);
        assert_eq!(value["radiation"]["device_id"], "82000001");
    }

    #[test]
    fn test_json_report_without_radiation_is_null() {
        let json = format_report_json(&reading(), None, &plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["radiation"].is_null());
    }

    #[test]
    fn test_sensor_list_text() {
        let sensors = vec![SensorInfo {
            index: 0,
            driver: "gpioths".to_string(),
            description: "DHT11/DHT22 Temperature and Humidity Sensor".to_string(),
        }];
        assert_eq!(
            format_sensor_list_text(&sensors),
            "ID  Driver       Description\n\
             0   gpioths      DHT11/DHT22 Temperature and Humidity Sensor\n"
        );
    }

    #[test]
    fn test_sensor_list_json() {
        let sensors = vec![SensorInfo {
            index: 3,
            driver: "dht11".to_string(),
            description: "IIO device 3".to_string(),
        }];
        let json = format_sensor_list_json(&sensors, &plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["index"], 3);
        assert_eq!(value[0]["driver"], "dht11");
    }
}
