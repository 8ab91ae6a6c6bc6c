//! Source-annotated diagnostics for part and offer files

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A YAML file that failed to parse or did not match its entity
#[derive(Debug, Error, Diagnostic)]
#[error("YAML syntax error: {message}")]
#[diagnostic(code(indabom::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        // Errors without a location point at the start of the file
        let offset = err
            .location()
            .map(|loc| loc.index().min(source.len()))
            .unwrap_or(0);
        let message = err.to_string();

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1).min(source.len().max(1))),
            help: hint_for(&message).map(str::to_string),
            message,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Message fragments with the fix a user most likely needs
const HINTS: &[(&[&str], &str)] = &[
    (
        &["invalid part number", "invalid item number", "invalid variation", "invalid class code"],
        "part numbers look like 100-0001-01: class code, 4-digit item, 2-digit variation",
    ),
    (
        &["invalid decimal", "invalid digit", "number has a high precision"],
        "costs are plain decimals without a currency symbol, e.g. unit_cost: \"1.25\"",
    ),
    (
        &["unknown variant"],
        "offer source is either `distributor` or `seller`",
    ),
    (
        &["missing field `number`", "missing field `description`"],
        "every part file needs at least `number` and `description`",
    ),
    (&["tab"], "indent with spaces, not tabs"),
    (&["duplicate key"], "each key may appear only once per mapping"),
    (
        &["mapping values are not allowed", "expected block end"],
        "check the indentation of this line and the one above it",
    ),
];

fn hint_for(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    HINTS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, hint)| *hint)
}
