use std::path::Path;
use std::process;

use super::{print_json, Settings};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_parse(file: &Path, settings: &Settings) {
    let deck = settings.parse_or_exit(file);

    match settings.output {
        OutputFormat::Text => print!("{}", deck),
        OutputFormat::Json => match serde_json::to_value(&deck) {
            Ok(value) => print_json(&value, settings.output, settings.quiet),
            Err(e) => {
                let msg = format!("serialization error: {}", e);
                report_error(&msg, settings.output, settings.quiet);
                process::exit(1);
            }
        },
    }
}
