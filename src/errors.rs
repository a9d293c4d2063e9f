//! General error types for the parser and the document model

use std::fmt::{Display, Formatter};

use crate::coords::Coords;
use crate::lexer::Token;
use crate::value::Kind;

/// Global result type used throughout the parser stages
pub type ParserResult<T> = Result<T, ParserError>;

/// Result type for operations against a document tree
pub type DomResult<T> = Result<T, DomError>;

/// Enumeration of the parser stages that can produce an error
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParserErrorSource {
    /// The lexer stage of the parser
    Lexer,
    /// The tree construction stage of the parser
    DomParser,
}

impl Display for ParserErrorSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserErrorSource::Lexer => write!(f, "lexer"),
            ParserErrorSource::DomParser => write!(f, "dom parser"),
        }
    }
}

/// A global enumeration of parser error codes
#[derive(Debug, Clone, PartialEq)]
pub enum ParserErrorDetails {
    /// There was nothing to parse
    ZeroLengthInput,
    /// The input ended part way through a value
    EndOfInput,
    /// The input bytes are not valid for the selected encoding
    NonUtf8InputDetected,
    /// A token turned up where the grammar doesn't allow it
    UnexpectedToken(Token),
    /// An object key wasn't followed by a colon and a value
    PairExpected,
    /// Malformed object
    InvalidObject,
    /// Malformed array
    InvalidArray,
    /// A character that can't start or continue any token
    InvalidCharacter(char),
    /// A literal (`null`, `true`, `false`) failed to match
    MatchFailed(String, String),
    /// Malformed number
    InvalidNumericRepresentation(String),
    /// Unknown escape sequence within a string
    InvalidEscapeSequence(String),
    /// Malformed `\u` escape, including lone surrogates
    InvalidUnicodeEscapeSequence(String),
    /// Raw control character found inside a string
    ControlCharacterInString(char),
    /// Something other than whitespace follows the root value
    TrailingCharacters,
    /// Containers nested deeper than the configured limit
    MaximumDepthExceeded(usize),
}

impl Display for ParserErrorDetails {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserErrorDetails::ZeroLengthInput => write!(f, "zero length input"),
            ParserErrorDetails::EndOfInput => write!(f, "end of input reached prematurely"),
            ParserErrorDetails::NonUtf8InputDetected => write!(f, "invalid input encoding"),
            ParserErrorDetails::UnexpectedToken(token) => {
                write!(f, "unexpected token found: {}", token)
            }
            ParserErrorDetails::PairExpected => write!(f, "pair expected, something else found"),
            ParserErrorDetails::InvalidObject => write!(f, "invalid object"),
            ParserErrorDetails::InvalidArray => write!(f, "invalid array"),
            ParserErrorDetails::InvalidCharacter(c) => write!(f, "invalid character: {:?}", c),
            ParserErrorDetails::MatchFailed(expected, found) => {
                write!(f, "match failed, expected {}, found {}", expected, found)
            }
            ParserErrorDetails::InvalidNumericRepresentation(repr) => {
                write!(f, "invalid number representation: \"{}\"", repr)
            }
            ParserErrorDetails::InvalidEscapeSequence(seq) => {
                write!(f, "invalid escape sequence: \"{}\"", seq)
            }
            ParserErrorDetails::InvalidUnicodeEscapeSequence(seq) => {
                write!(f, "invalid unicode escape sequence: \"{}\"", seq)
            }
            ParserErrorDetails::ControlCharacterInString(c) => {
                write!(f, "unescaped control character in string: {:?}", c)
            }
            ParserErrorDetails::TrailingCharacters => {
                write!(f, "trailing characters after the root value")
            }
            ParserErrorDetails::MaximumDepthExceeded(depth) => {
                write!(f, "maximum nesting depth of {} exceeded", depth)
            }
        }
    }
}

/// The general parser error structure
#[derive(Debug, Clone, PartialEq)]
pub struct ParserError {
    /// The originating stage for the error
    pub source: ParserErrorSource,
    /// The global error code for the error
    pub details: ParserErrorDetails,
    /// Optional parser coordinates
    pub coords: Option<Coords>,
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.coords {
            Some(coords) => write!(
                f,
                "{} error: {}, at {}",
                self.source, self.details, coords
            ),
            None => write!(f, "{} error: {}", self.source, self.details),
        }
    }
}

impl std::error::Error for ParserError {}

/// Errors raised by accessors and mutators on a document tree. These all indicate a
/// mistake on the caller's side (asking a string for its members and the like)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The node doesn't hold the type the operation needs
    TypeMismatch {
        /// The kind required by the operation
        expected: Kind,
        /// The kind actually held by the node
        found: Kind,
    },
    /// No member with the given key
    MemberNotFound(String),
    /// Index outside of `[0, len)`
    IndexOutOfBounds {
        /// The requested index
        index: usize,
        /// Number of elements (or members) available
        len: usize,
    },
    /// A dotted path couldn't be resolved
    PathNotFound(String),
    /// A [crate::arena::NodeId] belonging to a different document
    ForeignHandle,
}

impl Display for DomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DomError::TypeMismatch { expected, found } => {
                write!(f, "expected a value of type {}, found {}", expected, found)
            }
            DomError::MemberNotFound(key) => write!(f, "member \"{}\" not found", key),
            DomError::IndexOutOfBounds { index, len } => {
                write!(f, "index {} out of bounds for length {}", index, len)
            }
            DomError::PathNotFound(path) => write!(f, "path \"{}\" not found", path),
            DomError::ForeignHandle => write!(f, "node handle belongs to another document"),
        }
    }
}

impl std::error::Error for DomError {}

/// Helper macro for cooking up a lexer error
#[macro_export]
macro_rules! lexer_error {
    ($details: expr, $coords : expr) => {
        Err($crate::errors::ParserError {
            source: $crate::errors::ParserErrorSource::Lexer,
            details: $details,
            coords: Some($coords),
        })
    };
    ($details: expr) => {
        Err($crate::errors::ParserError {
            source: $crate::errors::ParserErrorSource::Lexer,
            details: $details,
            coords: None,
        })
    };
}

/// Helper macro for cooking up a tree construction error
#[macro_export]
macro_rules! dom_parser_error {
    ($details: expr, $coords: expr) => {
        Err($crate::errors::ParserError {
            source: $crate::errors::ParserErrorSource::DomParser,
            details: $details,
            coords: Some($coords),
        })
    };
    ($details: expr) => {
        Err($crate::errors::ParserError {
            source: $crate::errors::ParserErrorSource::DomParser,
            details: $details,
            coords: None,
        })
    };
}

/// Helper macro for a type mismatch against a node
#[macro_export]
macro_rules! type_mismatch {
    ($expected: expr, $found: expr) => {
        Err($crate::errors::DomError::TypeMismatch {
            expected: $expected,
            found: $found,
        })
    };
}
