//! Report generation
//!
//! Renders decoded streams as plain text (one block per stream, one line per
//! field) or as a single JSON document.

use crate::config::OutputConfig;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use tidal_decoder::{FieldShape, ParseStats, Parser, Stream, Value};

#[derive(Debug, Serialize)]
struct LogReport<'a> {
    streams: Vec<StreamReport<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<&'a ParseStats>,
}

#[derive(Debug, Serialize)]
struct StreamReport<'a> {
    name: &'a str,
    records: usize,
    timestamps: &'a [u64],
    fields: Vec<FieldReport<'a>>,
}

#[derive(Debug, Serialize)]
struct FieldReport<'a> {
    name: &'a str,
    #[serde(flatten)]
    shape: FieldShape,
    values: Vec<Value>,
}

impl<'a> StreamReport<'a> {
    fn new(stream: &'a Stream, max_rows: Option<usize>) -> Self {
        let rows = max_rows.map_or(stream.len(), |max| max.min(stream.len()));
        let fields = stream
            .columns()
            .iter()
            .map(|column| FieldReport {
                name: column.name(),
                shape: column.shape(),
                values: (0..rows).filter_map(|row| column.value(row)).collect(),
            })
            .collect();

        Self {
            name: stream.name(),
            records: stream.len(),
            timestamps: &stream.timestamps()[..rows],
            fields,
        }
    }
}

fn selected_streams<'a>(parsed: &'a Parser, options: &OutputConfig) -> Vec<StreamReport<'a>> {
    for wanted in &options.streams {
        if parsed.get(wanted).is_none() {
            log::warn!("Stream '{}' not found in log", wanted);
        }
    }

    parsed
        .streams()
        .filter(|stream| options.should_print(stream.name()))
        .map(|stream| StreamReport::new(stream, options.max_rows))
        .collect()
}

/// Write the human-readable report
pub fn write_text<W: Write>(out: &mut W, parsed: &Parser, options: &OutputConfig) -> Result<()> {
    writeln!(out, "Read the following streams:")?;

    for report in selected_streams(parsed, options) {
        writeln!(out, "======== {} ========", report.name)?;
        writeln!(out, "records: {}", report.records)?;
        writeln!(out, "time: {}", join(report.timestamps.iter()))?;
        for field in &report.fields {
            writeln!(
                out,
                "{} ({}): {}",
                field.name,
                field.shape,
                join(field.values.iter())
            )?;
        }
        if report.timestamps.len() < report.records {
            writeln!(
                out,
                "... {} more records",
                report.records - report.timestamps.len()
            )?;
        }
    }

    if options.stats {
        let stats = parsed.stats();
        writeln!(out, "\nStatistics:")?;
        writeln!(out, "  Streams:          {}", stats.num_streams)?;
        writeln!(out, "  Metadata records: {}", stats.metadata_records)?;
        writeln!(out, "  Label records:    {}", stats.label_records)?;
        writeln!(out, "  Data records:     {}", stats.data_records)?;
        writeln!(out, "  Replaced schemas: {}", stats.schema_replacements)?;
        writeln!(out, "  Bytes read:       {}", stats.bytes_read)?;
    }

    Ok(())
}

/// Write the report as one pretty-printed JSON document
pub fn write_json<W: Write>(out: &mut W, parsed: &Parser, options: &OutputConfig) -> Result<()> {
    let report = LogReport {
        streams: selected_streams(parsed, options),
        stats: options.stats.then(|| parsed.stats()),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn join<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    let parts: Vec<String> = items.map(|item| item.to_string()).collect();
    format!("[{}]", parts.join(", "))
}
