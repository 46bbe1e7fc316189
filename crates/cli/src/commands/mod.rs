mod check;
mod keywords;
mod parse;

pub(crate) use check::cmd_check;
pub(crate) use keywords::cmd_keywords;
pub(crate) use parse::cmd_parse;

use std::fs;
use std::path::Path;
use std::process;

use rawdeck_core::{
    DeckError, DeckParser, IncludeMode, ParseOptions, PolicyTable, RawDeck,
};
use tracing::debug;

use crate::{report_error, OutputFormat};

/// Everything the subcommands need, resolved once from the global flags.
pub(crate) struct Settings {
    pub(crate) policies: PolicyTable,
    pub(crate) options: ParseOptions,
    pub(crate) output: OutputFormat,
    pub(crate) quiet: bool,
}

impl Settings {
    pub(crate) fn load(
        keywords: Option<&Path>,
        no_includes: bool,
        output: OutputFormat,
        quiet: bool,
    ) -> Result<Self, DeckError> {
        let mut policies = PolicyTable::eclipse();
        if let Some(path) = keywords {
            let origin = path.display().to_string();
            let text = fs::read_to_string(path).map_err(|e| {
                DeckError::invalid_input(
                    &origin,
                    0,
                    format!("cannot read keyword table '{}': {}", origin, e),
                )
            })?;
            let extra = PolicyTable::from_json(&text, &origin)?;
            debug!(file = %origin, entries = extra.len(), "loaded keyword table");
            policies = policies.merge(extra);
        }

        let includes = if no_includes {
            IncludeMode::Retain
        } else {
            IncludeMode::Expand
        };

        Ok(Settings {
            policies,
            options: ParseOptions { includes },
            output,
            quiet,
        })
    }

    /// Parse `file`, or report the error and exit with status 1.
    pub(crate) fn parse_or_exit(&self, file: &Path) -> RawDeck {
        let result = DeckParser::new(&self.policies)
            .with_options(self.options)
            .parse(file);
        match result {
            Ok(deck) => deck,
            Err(e) => {
                report_deck_error(&e, self.output, self.quiet);
                process::exit(1);
            }
        }
    }
}

/// JSON errors carry the full structured payload and ignore `--quiet`.
pub(crate) fn report_deck_error(e: &DeckError, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e.message));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error[{}]: {}", e.kind.as_str(), e);
            }
        }
    }
}

/// Pretty-print `value` to stdout, or fail the command if it cannot be
/// serialized.
pub(crate) fn print_json(value: &serde_json::Value, output: OutputFormat, quiet: bool) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            report_error(&format!("serialization error: {}", e), output, quiet);
            process::exit(1);
        }
    }
}
