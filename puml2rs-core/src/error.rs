//! Compile-time diagnostics.
//!
//! Every failure is fatal and points at the offending construct: the source
//! file, the line number and the original line text.

use std::fmt;

/// A position in the diagram source, printed as `file:line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Error raised while parsing or validating a state diagram.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("{location}: duplicate initial transition for state `{name}`")]
    DuplicateInitial { location: Location, name: String },

    #[error("{location}: additional text after initial transition: {text}")]
    TrailingAfterInitial { location: Location, text: String },

    #[error("{location}: invalid transition format: {text}")]
    MalformedTransition { location: Location, text: String },

    #[error("{location}: missing event in transition: {text}")]
    MissingEvent { location: Location, text: String },

    #[error("{location}: state `{name}` has not been defined")]
    UndefinedState { location: Location, name: String },

    #[error("{location}: the target state `{name}` of the initial transition has not been defined")]
    UndefinedInitialTarget { location: Location, name: String },

    #[error("{location}: closing brace does not match any opening brace")]
    UnmatchedClosingBrace { location: Location },

    #[error("{location}: state block opened here is never closed")]
    UnclosedBlock { location: Location },

    #[error("no initial top level state specified")]
    MissingTopLevelInitial,

    #[error("multiple initial top level states specified: {names}")]
    MultipleTopLevelInitial { names: String },

    #[error("no initial state specified in composite state `{name}`")]
    MissingCompositeInitial { name: String },

    #[error("multiple initial states specified in composite state `{name}`")]
    MultipleCompositeInitial { name: String },

    #[error("{location}: no idea how to parse this line: {text}")]
    UnrecognizedConstruct { location: Location, text: String },
}
