use std::path::Path;

use super::{print_json, Settings};
use crate::OutputFormat;

pub(crate) fn cmd_check(file: &Path, settings: &Settings) {
    let deck = settings.parse_or_exit(file);
    let unrecognized = deck.unrecognized_keywords().count();

    match settings.output {
        OutputFormat::Text => {
            if settings.quiet {
                return;
            }
            if unrecognized > 0 {
                println!(
                    "ok: {} keywords ({} unrecognized)",
                    deck.len(),
                    unrecognized
                );
            } else {
                println!("ok: {} keywords", deck.len());
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "status": "ok",
                "keywords": deck.len(),
                "unrecognized": unrecognized,
            });
            print_json(&value, settings.output, settings.quiet);
        }
    }
}
