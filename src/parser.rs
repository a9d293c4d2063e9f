//! The DOM parser
//!
//! Pulls tokens from a [Lexer] and builds the corresponding nodes directly within an [Arena],
//! returning the id of the root node. Any JSON value is accepted as the root, and nothing but
//! whitespace may follow it. Containers still under construction are kept on an explicit stack
//! rather than the call stack, so nesting depth is only limited by the configuration.
use std::io::BufReader;

use crate::arena::{Arena, Member, Node, NodeId, StrRef};
use crate::coords::{Coords, Span};
use crate::decoders::{DecoderSelector, Encoding};
use crate::dom_parser_error;
use crate::errors::{ParserErrorDetails, ParserResult};
use crate::lexer::{Lexer, PackedToken, Token};

/// Parser configuration
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ParserConfig {
    /// Encoding used when parsing raw bytes. Defaults to Utf-8
    pub encoding: Encoding,
    /// Optional limit on the nesting depth of objects and arrays. Unlimited by default, so
    /// that anything the serializer writes can be read back
    pub max_depth: Option<usize>,
}

/// A container which has been opened but not yet closed
enum Open {
    Array(Vec<NodeId>),
    /// Members so far, plus the key of the member whose value is being parsed
    Object(Vec<Member>, StrRef),
}

/// Main JSON parser struct
#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct Parser {
    decoders: DecoderSelector,
    config: ParserConfig,
}

impl Parser {
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            decoders: Default::default(),
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse_str(&self, arena: &mut Arena, str: &str) -> ParserResult<NodeId> {
        if str.is_empty() {
            return dom_parser_error!(ParserErrorDetails::ZeroLengthInput, Coords::default());
        }
        let mut chars = str.chars();
        self.parse(arena, &mut chars)
    }

    /// Parse raw bytes, decoding them according to the configured [Encoding]
    pub fn parse_bytes(&self, arena: &mut Arena, bytes: &[u8]) -> ParserResult<NodeId> {
        if bytes.is_empty() {
            return dom_parser_error!(ParserErrorDetails::ZeroLengthInput, Coords::default());
        }
        if !self.config.encoding.validate(bytes) {
            return dom_parser_error!(ParserErrorDetails::NonUtf8InputDetected);
        }
        let mut reader = BufReader::new(bytes);
        let mut chars = self.decoders.new_decoder(&mut reader, self.config.encoding);
        self.parse(arena, &mut chars)
    }

    pub fn parse(
        &self,
        arena: &mut Arena,
        chars: &mut dyn Iterator<Item = char>,
    ) -> ParserResult<NodeId> {
        let mut lexer = Lexer::new(chars);
        let root = match lexer.consume()? {
            (Token::EndOfInput, span) => {
                return dom_parser_error!(ParserErrorDetails::ZeroLengthInput, span.start)
            }
            packed => self.parse_value(arena, &mut lexer, packed)?,
        };
        match lexer.consume()? {
            (Token::EndOfInput, _) => Ok(root),
            (_, span) => dom_parser_error!(ParserErrorDetails::TrailingCharacters, span.start),
        }
    }

    /// Parse a complete value starting with `packed`. Opening a container pushes it onto the
    /// stack; each completed value is then attached to the innermost open container, closing
    /// as many containers as the input does
    fn parse_value(
        &self,
        arena: &mut Arena,
        lexer: &mut Lexer,
        mut packed: PackedToken,
    ) -> ParserResult<NodeId> {
        let mut stack: Vec<Open> = vec![];
        loop {
            let mut value = match packed {
                (Token::StartObject, span) => {
                    self.check_depth(stack.len() + 1, span)?;
                    match lexer.consume()? {
                        (Token::EndObject, _) => arena.alloc(Node::Object(vec![])),
                        next => {
                            let key = self.parse_key(arena, lexer, next)?;
                            stack.push(Open::Object(vec![], key));
                            packed = lexer.consume()?;
                            continue;
                        }
                    }
                }
                (Token::StartArray, span) => {
                    self.check_depth(stack.len() + 1, span)?;
                    match lexer.consume()? {
                        (Token::EndArray, _) => arena.alloc(Node::Array(vec![])),
                        next => {
                            stack.push(Open::Array(vec![]));
                            packed = next;
                            continue;
                        }
                    }
                }
                (Token::Str(str), _) => {
                    let s = arena.alloc_str(&str);
                    arena.alloc(Node::String(s))
                }
                (Token::Integer(value), _) => arena.alloc(integer_node(value)),
                (Token::Float(value), _) => arena.alloc(Node::Double(value)),
                (Token::Boolean(value), _) => arena.alloc(Node::Bool(value)),
                (Token::Null, _) => arena.alloc(Node::Null),
                (Token::EndOfInput, span) => {
                    return dom_parser_error!(ParserErrorDetails::EndOfInput, span.start)
                }
                (token, span) => {
                    return dom_parser_error!(ParserErrorDetails::UnexpectedToken(token), span.start)
                }
            };

            loop {
                match stack.last_mut() {
                    None => return Ok(value),
                    Some(Open::Array(elements)) => {
                        elements.push(value);
                        match lexer.consume()? {
                            (Token::Comma, _) => {
                                packed = lexer.consume()?;
                                break;
                            }
                            (Token::EndArray, _) => (),
                            (Token::EndOfInput, span) => {
                                return dom_parser_error!(ParserErrorDetails::EndOfInput, span.start)
                            }
                            (_, span) => {
                                return dom_parser_error!(ParserErrorDetails::InvalidArray, span.start)
                            }
                        }
                    }
                    Some(Open::Object(members, key)) => {
                        members.push(Member { key: *key, value });
                        match lexer.consume()? {
                            (Token::Comma, _) => {
                                let next = lexer.consume()?;
                                *key = self.parse_key(arena, lexer, next)?;
                                packed = lexer.consume()?;
                                break;
                            }
                            (Token::EndObject, _) => (),
                            (Token::EndOfInput, span) => {
                                return dom_parser_error!(ParserErrorDetails::EndOfInput, span.start)
                            }
                            (_, span) => {
                                return dom_parser_error!(
                                    ParserErrorDetails::InvalidObject,
                                    span.start
                                )
                            }
                        }
                    }
                }
                // The innermost container has just been closed
                value = match stack.pop() {
                    Some(Open::Array(elements)) => arena.alloc(Node::Array(elements)),
                    Some(Open::Object(members, _)) => arena.alloc(Node::Object(members)),
                    None => return Ok(value),
                };
            }
        }
    }

    /// An object key must be a string followed by a colon
    fn parse_key(
        &self,
        arena: &mut Arena,
        lexer: &mut Lexer,
        packed: PackedToken,
    ) -> ParserResult<StrRef> {
        let key = match packed {
            (Token::Str(key), _) => key,
            (Token::EndOfInput, span) => {
                return dom_parser_error!(ParserErrorDetails::EndOfInput, span.start)
            }
            (_, span) => return dom_parser_error!(ParserErrorDetails::InvalidObject, span.start),
        };
        match lexer.consume()? {
            (Token::Colon, _) => Ok(arena.alloc_str(&key)),
            (Token::EndOfInput, span) => {
                dom_parser_error!(ParserErrorDetails::EndOfInput, span.start)
            }
            (_, span) => dom_parser_error!(ParserErrorDetails::PairExpected, span.start),
        }
    }

    fn check_depth(&self, depth: usize, span: Span) -> ParserResult<()> {
        match self.config.max_depth {
            Some(limit) if depth > limit => dom_parser_error!(
                ParserErrorDetails::MaximumDepthExceeded(limit),
                span.start
            ),
            _ => Ok(()),
        }
    }
}

/// Integers take the narrowest representation that holds them
fn integer_node(value: i64) -> Node {
    match i32::try_from(value) {
        Ok(value) => Node::Int(value),
        Err(_) => Node::Int64(value),
    }
}
