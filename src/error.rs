//! Error taxonomy for the parser.
//!
//! Every error the parser can raise carries the position of the offending
//! token and is classified into one of the kinds from the design's error
//! taxonomy. The parser itself never panics on malformed input; `ParseError`
//! is the only channel for reporting failure to a caller.
use std::fmt::Display;

use crate::lexer::Position;

/// Coarse classification of a `ParseError`, mirroring the taxonomy used to
/// decide how a caller should react (retry, abort session, report capability
/// gap, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid character, unterminated string/quoted-symbol/constant, EOF in comment.
    Lex,
    /// Expected `(`/`)`/symbol/constant/sort but found something else.
    Syntax,
    /// Undefined symbol, sort mismatch, arity mismatch, redefinition, etc.
    Semantic,
    /// Requested a capability the current configuration/logic doesn't provide.
    Capability,
    /// Defensive guard for a state that should be unreachable.
    Internal,
}

#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub file: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(kind: ErrorKind, file: impl ToString, position: Position, message: impl ToString) -> Self {
        ParseError {
            kind,
            message: message.to_string(),
            file: file.to_string(),
            position,
        }
    }

    pub fn lex(file: impl ToString, position: Position, message: impl ToString) -> Self {
        Self::new(ErrorKind::Lex, file, position, message)
    }

    pub fn syntax(file: impl ToString, position: Position, message: impl ToString) -> Self {
        Self::new(ErrorKind::Syntax, file, position, message)
    }

    pub fn semantic(file: impl ToString, position: Position, message: impl ToString) -> Self {
        Self::new(ErrorKind::Semantic, file, position, message)
    }

    pub fn capability(file: impl ToString, position: Position, message: impl ToString) -> Self {
        Self::new(ErrorKind::Capability, file, position, message)
    }

    pub fn internal(file: impl ToString, position: Position, message: impl ToString) -> Self {
        Self::new(ErrorKind::Internal, file, position, message)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (line, col) = self.position;
        f.write_str(&format!("{}:{}:{}: {}", self.file, line, col, self.message))
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;
