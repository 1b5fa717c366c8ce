// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeMap;

pub const EXPORT_FILE_NAME: &str = "table-export.csv";

/// Decodes CSV import text: first row is the header, blank lines are
/// skipped, header cells become field keys verbatim. Any parse error,
/// including a row whose field count differs from the header, aborts the
/// whole import; the caller mutates nothing on failure.
pub fn parse_records(text: &str) -> Result<Vec<BTreeMap<String, String>>> {
    let mut reader = ReaderBuilder::new().from_reader(text.as_bytes());

    let headers = reader.headers().context("parse CSV header")?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("parse CSV row")?;
        let row: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, field)| (header.to_owned(), field.to_owned()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Encodes a rectangular table (header labels + stringified cells) as CSV.
pub fn serialize_table(header: &[String], rows: &[Vec<String>]) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(header).context("write CSV header")?;
    for row in rows {
        writer.write_record(row).context("write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|error| error.into_error())
        .context("flush CSV output")?;
    String::from_utf8(bytes).context("encode CSV output")
}
