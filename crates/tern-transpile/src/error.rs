//! Error types.
//!
//! None of these abort a compilation: they are converted into
//! diagnostics by the dispatcher and processing continues.

use std::fmt;

/// A capacity-bounded table inside the compilation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Variables,
    Blocks,
    Functions,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Variables => write!(f, "variable table"),
            Resource::Blocks => write!(f, "block nesting"),
            Resource::Functions => write!(f, "function table"),
        }
    }
}

/// An insertion was refused because a table is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{resource} limit of {limit} exceeded")]
pub struct CapacityError {
    pub resource: Resource,
    pub limit: usize,
}

/// A problem found while parsing a single line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("missing '{token}' in '{statement}' statement")]
    MissingToken {
        token: &'static str,
        statement: &'static str,
    },

    #[error("missing {what} in '{statement}' statement")]
    MissingOperand {
        what: &'static str,
        statement: &'static str,
    },

    #[error("{name}() expects {expected} arguments, got {got}")]
    Arity {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("'{0}' is not a valid name")]
    InvalidName(String),

    #[error("unexpected '{0}'")]
    Unexpected(String),
}

/// An operating mode name was not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}' (expected optimized, raw, debug, debug_opt or debug_raw)")]
pub struct ModeError(pub String);
