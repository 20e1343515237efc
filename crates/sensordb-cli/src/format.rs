//! Output formatting utilities for text, JSON, and CSV output.

use std::fmt::Write as _;

use anyhow::Result;
use sensordb_store::{Sample, export};

use crate::cli::OutputFormat;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

/// Format a single sample.
pub fn format_sample(
    sample: &Sample,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<String> {
    let output = match format {
        OutputFormat::Text => format_sample_text(sample),
        OutputFormat::Json => format_json(sample, opts)?,
        OutputFormat::Csv => export::to_csv(std::slice::from_ref(sample))?,
    };
    Ok(output)
}

/// Format a list of samples.
pub fn format_samples(
    samples: &[Sample],
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<String> {
    let output = match format {
        OutputFormat::Text => format_samples_text(samples),
        OutputFormat::Json => {
            let mut json = export::to_json(samples, !opts.compact)?;
            json.push('\n');
            json
        }
        OutputFormat::Csv => export::to_csv(samples)?,
    };
    Ok(output)
}

fn format_json<T: serde::Serialize>(value: &T, opts: &FormatOptions) -> Result<String> {
    let mut json = if opts.compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    json.push('\n');
    Ok(json)
}

/// Format a single sample as labelled text.
pub fn format_sample_text(sample: &Sample) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Sample #{} ({} UTC)", sample.id, sample.timestamp);
    let _ = writeln!(
        output,
        "  BMP280 temperature: {:.2} °C",
        sample.bmp280_temperature
    );
    let _ = writeln!(output, "  BMP280 pressure:    {:.2} hPa", sample.bmp280_pressure);
    let _ = writeln!(
        output,
        "  HTU21D temperature: {:.2} °C",
        sample.htu21d_temperature
    );
    let _ = writeln!(output, "  HTU21D humidity:    {:.2} %", sample.htu21d_humidity);
    output
}

/// Format samples as an aligned table.
pub fn format_samples_text(samples: &[Sample]) -> String {
    if samples.is_empty() {
        return "No samples found.\n".to_string();
    }

    let mut output = format!("History ({} samples):\n\n", samples.len());
    let _ = writeln!(
        output,
        "{:>8}  {:<19}  {:>9}  {:>9}  {:>9}  {:>9}",
        "ID", "Timestamp", "BMP T(C)", "P (hPa)", "HTU T(C)", "RH (%)"
    );
    for sample in samples {
        let _ = writeln!(
            output,
            "{:>8}  {:<19}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9.2}",
            sample.id,
            sample.timestamp,
            sample.bmp280_temperature,
            sample.bmp280_pressure,
            sample.htu21d_temperature,
            sample.htu21d_humidity
        );
    }
    output
}
