use anyhow::{Error, Result};

use crate::counters::CounterRecord;
use crate::parse::{extract_labels, parse_codes};
use crate::pfm::EventTool;

/// Lists all event labels `tool` knows about.
pub fn extract<T: EventTool>(tool: &T) -> Result<Vec<String>, Error> {
    let text = tool.show_event_info()?;
    let labels = extract_labels(&text);
    log::info!("found {} event labels", labels.len());
    Ok(labels)
}

/// Asks `tool` for the code of every label, in order.
///
/// Labels `tool` cannot encode are skipped. Launch failures are errors.
pub fn resolve<T: EventTool>(labels: &[String], tool: &T) -> Result<Vec<CounterRecord>, Error> {
    let mut records = Vec::new();

    for label in labels {
        let output = tool.check_event(label)?;
        match parse_codes(&output) {
            Some(code) => {
                log::trace!("{label} -> {code}");
                records.push(CounterRecord::new(label, code));
            }
            None => log::debug!("no code for {label}"),
        }
    }

    Ok(records)
}
