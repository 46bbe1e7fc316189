use std::path::Path;

use super::{print_json, Settings};
use crate::OutputFormat;

/// One line per keyword in deck order. Keywords parsed with the unknown
/// fallback get a trailing `?`.
pub(crate) fn cmd_keywords(file: &Path, settings: &Settings) {
    let deck = settings.parse_or_exit(file);

    match settings.output {
        OutputFormat::Text => {
            for keyword in &deck {
                let marker = if keyword.is_recognized() { "" } else { "?" };
                println!("{}\t{}{}", keyword.name(), keyword.records().len(), marker);
            }
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = deck
                .iter()
                .map(|k| {
                    serde_json::json!({
                        "name": k.name(),
                        "records": k.records().len(),
                        "recognized": k.is_recognized(),
                        "file": k.location().file,
                        "line": k.location().line,
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(entries), settings.output, settings.quiet);
        }
    }
}
