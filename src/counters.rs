use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

use anyhow::{Context as _, Error, Result};
use camino::Utf8Path;
use thiserror::Error;

/// A resolved event label and its raw code, as printed by `check_events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRecord {
    pub label: String,
    pub code: String,
}

impl CounterRecord {
    pub fn new(label: &str, code: &str) -> Self {
        CounterRecord {
            label: label.to_string(),
            code: code.to_string(),
        }
    }
}

impl fmt::Display for CounterRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{},{}", self.label, self.code)
    }
}

pub struct CounterWriter {
    file: BufWriter<File>,
    count: usize,
}

impl CounterWriter {
    /// Creates `path`, truncating it if it exists.
    pub fn new(path: &Utf8Path) -> std::io::Result<CounterWriter> {
        Ok(CounterWriter {
            file: BufWriter::new(File::create(path)?),
            count: 0,
        })
    }

    pub fn write_record(&mut self, record: &CounterRecord) -> std::io::Result<()> {
        self.file.write_all(record.to_string().as_bytes())?;
        self.count += 1;
        Ok(())
    }

    /// Flushes the file and returns the number of records written.
    pub fn finish(mut self) -> std::io::Result<usize> {
        self.file.flush()?;
        Ok(self.count)
    }
}

/// Writes `records` to `path`, one `label,code` line each, no header.
pub fn write_counters(path: &Utf8Path, records: &[CounterRecord]) -> Result<usize, Error> {
    let mut writer = CounterWriter::new(path).with_context(|| format!("creating {path}"))?;
    for record in records {
        writer
            .write_record(record)
            .with_context(|| format!("writing {path}"))?;
    }
    writer.finish().with_context(|| format!("writing {path}"))
}

/// A counter as a consumer of the generated file sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterConfig {
    pub name: String,
    pub config: u64,
    pub extended_config: u64,
    pub kind: Option<u32>,
}

impl fmt::Display for CounterConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{:#x}", self.name, self.config)?;
        match self.kind {
            Some(kind) => write!(f, ",{:#x},{kind}", self.extended_config),
            None if self.extended_config != 0 => write!(f, ",{:#x}", self.extended_config),
            None => Ok(()),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CounterFileError {
    #[error("counter `{name}` not found in {path}")]
    MissingCounter { name: String, path: String },
}

/// Parses decimal or `0x` prefixed hex numbers.
fn parse_number(s: &str) -> Option<u64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

/// Parses one `name,config[,extended_config[,type]]` line.
///
/// Lines without a name or without a parseable config yield `None`. Extra
/// fields that do not parse fall back to their defaults.
pub fn parse_counter_line(line: &str) -> Option<CounterConfig> {
    let mut fields = line.split(',');
    let name = fields.next()?;
    let config = parse_number(fields.next()?)?;
    let extended_config = fields.next().and_then(parse_number).unwrap_or(0);
    let kind = fields
        .next()
        .and_then(parse_number)
        .and_then(|kind| u32::try_from(kind).ok());

    if name.is_empty() {
        return None;
    }

    Some(CounterConfig {
        name: name.to_string(),
        config,
        extended_config,
        kind,
    })
}

/// Reads a counter file, skipping lines that do not describe a counter.
pub fn read_counters(path: &Utf8Path) -> Result<Vec<CounterConfig>, Error> {
    let file = File::open(path).with_context(|| format!("opening {path}"))?;
    let mut counters = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("reading {path}"))?;
        match parse_counter_line(&line) {
            Some(counter) => counters.push(counter),
            None => log::debug!("{path}: skipping \"{line}\""),
        }
    }

    Ok(counters)
}

/// Looks up `name`. On duplicates, the first definition wins.
pub fn find_counter<'a>(
    counters: &'a [CounterConfig],
    name: &str,
    path: &Utf8Path,
) -> Result<&'a CounterConfig, CounterFileError> {
    counters
        .iter()
        .find(|counter| counter.name == name)
        .ok_or_else(|| CounterFileError::MissingCounter {
            name: name.to_string(),
            path: path.to_string(),
        })
}
