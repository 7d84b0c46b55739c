use thiserror::Error;

/// A command line that does not follow the controller grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty command line")]
    Empty,

    #[error("unknown verb '{0}'")]
    UnknownVerb(String),

    #[error("{verb} takes {expected} fields, got {found}")]
    FieldCount {
        verb: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{verb}: field {index} ('{value}') is not a valid number")]
    BadNumber {
        verb: &'static str,
        index: usize,
        value: String,
    },
}
