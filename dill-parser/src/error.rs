//! Error type shared by every stage of the decoder.

use std::fmt;
use thiserror::Error;

/// Result alias for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// The node family a dispatcher was decoding when it saw an unknown tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFamily {
    Expression,
    Statement,
    DartType,
    Constant,
    Initializer,
    Member,
}

impl fmt::Display for NodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeFamily::Expression => "Expression",
            NodeFamily::Statement => "Statement",
            NodeFamily::DartType => "DartType",
            NodeFamily::Constant => "Constant",
            NodeFamily::Initializer => "Initializer",
            NodeFamily::Member => "Member",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Bounds,
    TagMismatch,
    UnknownTag,
    Integrity,
    InvalidConstantPayload,
    Format,
}

/// Every way a component decode can fail. All of them are fatal to the
/// enclosing component.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A cursor move or read left the `[0, length]` range of its window.
    #[error(
        "access of {wanted} byte(s) at position {position} is outside window of length {length} (absolute base {base:#x})"
    )]
    OutOfBounds {
        position: usize,
        wanted: usize,
        length: usize,
        base: usize,
    },

    #[error("improper tag: actual = {actual}; expected = {expected}")]
    TagMismatch { actual: u8, expected: u8 },

    #[error("{family}: unrecognized tag ({tag})")]
    UnknownTag { family: NodeFamily, tag: u8 },

    /// Redundant copies of a value disagree.
    #[error("{field} not as expected: {expected} != {found}")]
    Integrity {
        field: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("IntConstant wraps an expression with tag {tag}, which is not an integer literal")]
    InvalidConstantPayload { tag: u8 },

    #[error("component magic should be {expected:#010x} but was {found:#010x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("invalid option tag ({tag})")]
    InvalidOptionTag { tag: u8 },

    #[error("a string table is already attached to this session")]
    StringTableAttached,

    #[error("invalid UTF-8 in {context}")]
    InvalidUtf8 { context: &'static str },

    #[error("{kind} reference {index} is out of range (table holds {len})")]
    InvalidReference {
        kind: &'static str,
        index: u32,
        len: usize,
    },

    #[error("format error: {0}")]
    Format(String),
}

impl DecodeError {
    /// Creates a new [`DecodeError::Format`] with the provided message.
    pub fn format(message: impl Into<String>) -> Self {
        DecodeError::Format(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::OutOfBounds { .. } => ErrorKind::Bounds,
            DecodeError::TagMismatch { .. } => ErrorKind::TagMismatch,
            DecodeError::UnknownTag { .. } => ErrorKind::UnknownTag,
            DecodeError::Integrity { .. } => ErrorKind::Integrity,
            DecodeError::InvalidConstantPayload { .. } => ErrorKind::InvalidConstantPayload,
            DecodeError::BadMagic { .. }
            | DecodeError::InvalidOptionTag { .. }
            | DecodeError::StringTableAttached
            | DecodeError::InvalidUtf8 { .. }
            | DecodeError::InvalidReference { .. }
            | DecodeError::Format(_) => ErrorKind::Format,
        }
    }
}
