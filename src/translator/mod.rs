//! The Translator module turns stack-machine VM programs into Hack
//! assembly.
//!
//! It does this with a line classifier ([`parser`]) and a code writer
//! ([`codegen::CodeWriter`]). The driver feeds one raw line at a time to
//! [`parser::parse_line`] and hands each resulting [`command::Command`] to
//! the writer, strictly in source order: generated-label uniqueness and
//! the call/return frame protocol both depend on sequential emission.
//!
//! Any [`TranslateError`] aborts the whole run. A malformed command has no
//! valid partial translation, and every later label and frame computation
//! assumes each earlier command emitted a complete block.

pub mod codegen;
pub mod command;
pub mod parser;

use std::error;
use std::fmt;

/// Errors that abort a translation run. The driver attaches the file and
/// line of the offending command when reporting.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TranslateError {
    /// Unknown mnemonic, wrong operand arity, or an operand that is not a
    /// non-negative integer where one is required.
    MalformedCommand(String),
    /// A push/pop referenced a segment slot with no resolvable address,
    /// e.g. `pop constant 1` or `pointer 2`.
    UnresolvedSegment(String),
    /// A `static` reference appeared before any module name was set.
    MissingModuleContext(u16),
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TranslateError::MalformedCommand(why) => write!(f, "malformed command: {}", why),
            TranslateError::UnresolvedSegment(why) => write!(f, "unresolved segment: {}", why),
            TranslateError::MissingModuleContext(index) => write!(
                f,
                "static {} referenced before any module name was set",
                index
            ),
        }
    }
}

impl error::Error for TranslateError {}
