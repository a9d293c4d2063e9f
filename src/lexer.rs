//! The lexer pulls `char`s from an underlying iterator and produces a stream of [Token]s,
//! each packed along with the [Span] it occupies within the input. The lexer is strict about
//! the JSON grammar at the token level (number syntax, escapes, literals) and leaves the
//! structural checks to the parser.
use std::fmt::{Display, Formatter};

use crate::coords::{Coords, Span};
use crate::errors::{ParserErrorDetails, ParserResult};
use crate::lexer_error;

/// Initial capacity of the scratch buffer used for numbers
const DEFAULT_BUFFER_SIZE: usize = 64;

/// Enumeration of valid JSON tokens
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Colon,
    Comma,
    /// A string with all escape sequences already decoded
    Str(String),
    /// A number with no fraction or exponent which fits into an `i64`
    Integer(i64),
    /// Any other number
    Float(f64),
    Boolean(bool),
    Null,
    EndOfInput,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::StartObject => write!(f, "StartObject"),
            Token::EndObject => write!(f, "EndObject"),
            Token::StartArray => write!(f, "StartArray"),
            Token::EndArray => write!(f, "EndArray"),
            Token::Colon => write!(f, "Colon"),
            Token::Comma => write!(f, "Comma"),
            Token::Str(str) => write!(f, "String(\"{}\")", str),
            Token::Integer(value) => write!(f, "Integer({})", value),
            Token::Float(value) => write!(f, "Float({})", value),
            Token::Boolean(value) => write!(f, "Boolean({})", value),
            Token::Null => write!(f, "Null"),
            Token::EndOfInput => write!(f, "EndOfInput"),
        }
    }
}

/// A packed token consists of a [Token] and the [Span] associated with it
pub type PackedToken = (Token, Span);

/// Convenience macro for packing tokens along with their positional information
macro_rules! packed_token {
    ($t:expr, $s:expr, $e:expr) => {
        Ok(($t, Span { start: $s, end: $e }))
    };
    ($t:expr, $s:expr) => {
        Ok(($t, Span { start: $s, end: $s }))
    };
}

pub struct Lexer<'a> {
    /// The underlying source of characters
    chars: &'a mut dyn Iterator<Item = char>,
    /// Single character of lookahead
    lookahead: Option<char>,
    /// Set once the underlying iterator has run dry
    exhausted: bool,
    /// Coordinates of the most recently consumed character
    coords: Coords,
    /// Scratch buffer used to assemble numbers
    buffer: String,
}

impl<'a> Lexer<'a> {
    pub fn new(chars: &'a mut dyn Iterator<Item = char>) -> Self {
        Lexer {
            chars,
            lookahead: None,
            exhausted: false,
            coords: Coords::default(),
            buffer: String::with_capacity(DEFAULT_BUFFER_SIZE),
        }
    }

    /// Coordinates of the last character consumed by the lexer
    pub fn coords(&self) -> Coords {
        self.coords
    }

    /// Consume the next token from the input, skipping any leading whitespace. Once the input
    /// is exhausted, every subsequent call produces [Token::EndOfInput]
    pub fn consume(&mut self) -> ParserResult<PackedToken> {
        self.skip_whitespace();
        let c = match self.advance() {
            Some(c) => c,
            None => return packed_token!(Token::EndOfInput, self.coords),
        };
        let start = self.coords;
        match c {
            '{' => packed_token!(Token::StartObject, start),
            '}' => packed_token!(Token::EndObject, start),
            '[' => packed_token!(Token::StartArray, start),
            ']' => packed_token!(Token::EndArray, start),
            ':' => packed_token!(Token::Colon, start),
            ',' => packed_token!(Token::Comma, start),
            '"' => self.match_string(start),
            'n' => self.match_literal("null", Token::Null, start),
            't' => self.match_literal("true", Token::Boolean(true), start),
            'f' => self.match_literal("false", Token::Boolean(false), start),
            '-' | '0'..='9' => self.match_number(c, start),
            c => lexer_error!(ParserErrorDetails::InvalidCharacter(c), start),
        }
    }

    fn peek(&mut self) -> Option<char> {
        if self.lookahead.is_none() && !self.exhausted {
            self.lookahead = self.chars.next();
            self.exhausted = self.lookahead.is_none();
        }
        self.lookahead
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.lookahead = None;
        self.coords.advance(c);
        Some(c)
    }

    /// Only the four whitespace characters the JSON grammar allows are skipped
    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\n' | '\r') = self.peek() {
            self.advance();
        }
    }

    /// Match the remainder of a literal, the first character of which has already been consumed
    fn match_literal(
        &mut self,
        literal: &str,
        token: Token,
        start: Coords,
    ) -> ParserResult<PackedToken> {
        let mut found = String::from(&literal[..1]);
        for expected in literal.chars().skip(1) {
            match self.advance() {
                Some(c) if c == expected => found.push(c),
                Some(c) => {
                    found.push(c);
                    return lexer_error!(
                        ParserErrorDetails::MatchFailed(literal.to_string(), found),
                        self.coords
                    );
                }
                None => return lexer_error!(ParserErrorDetails::EndOfInput, self.coords),
            }
        }
        packed_token!(token, start, self.coords)
    }

    /// Push a run of (at least one) decimal digits into the buffer
    fn match_digits(&mut self) -> ParserResult<()> {
        let mut matched = false;
        while let Some(c @ '0'..='9') = self.peek() {
            self.buffer.push(c);
            self.advance();
            matched = true;
        }
        if matched {
            Ok(())
        } else {
            self.invalid_number()
        }
    }

    fn invalid_number<T>(&mut self) -> ParserResult<T> {
        if let Some(c) = self.peek() {
            self.buffer.push(c);
        }
        lexer_error!(
            ParserErrorDetails::InvalidNumericRepresentation(self.buffer.clone()),
            self.coords
        )
    }

    /// Match a number following the strict JSON grammar, then decide on an integer or floating
    /// point representation. Integers which overflow an `i64` fall back to floating point
    fn match_number(&mut self, first: char, start: Coords) -> ParserResult<PackedToken> {
        self.buffer.clear();
        self.buffer.push(first);
        let leading = if first == '-' {
            match self.advance() {
                Some(c @ '0'..='9') => {
                    self.buffer.push(c);
                    c
                }
                _ => return self.invalid_number(),
            }
        } else {
            first
        };
        if leading == '0' {
            if let Some('0'..='9') = self.peek() {
                return self.invalid_number();
            }
        } else if let Some('0'..='9') = self.peek() {
            self.match_digits()?;
        }

        let mut integral = true;
        if let Some('.') = self.peek() {
            integral = false;
            self.buffer.push('.');
            self.advance();
            self.match_digits()?;
        }
        if let Some(e @ ('e' | 'E')) = self.peek() {
            integral = false;
            self.buffer.push(e);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.buffer.push(sign);
                self.advance();
            }
            self.match_digits()?;
        }

        if integral {
            if let Some(value) = parse_integer(&self.buffer) {
                return packed_token!(Token::Integer(value), start, self.coords);
            }
        }
        match fast_float::parse::<f64, _>(self.buffer.as_bytes()) {
            Ok(value) if value.is_finite() => {
                packed_token!(Token::Float(value), start, self.coords)
            }
            _ => lexer_error!(
                ParserErrorDetails::InvalidNumericRepresentation(self.buffer.clone()),
                start
            ),
        }
    }

    /// Match a string, decoding escape sequences as we go. The opening quote has already been
    /// consumed
    fn match_string(&mut self, start: Coords) -> ParserResult<PackedToken> {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('"') => break,
                Some('\\') => self.match_escape_sequence(&mut value)?,
                Some(c) if c < '\u{20}' => {
                    return lexer_error!(
                        ParserErrorDetails::ControlCharacterInString(c),
                        self.coords
                    )
                }
                Some(c) => value.push(c),
                None => return lexer_error!(ParserErrorDetails::EndOfInput, self.coords),
            }
        }
        packed_token!(Token::Str(value), start, self.coords)
    }

    /// Match a single escape sequence, the backslash having already been consumed
    fn match_escape_sequence(&mut self, value: &mut String) -> ParserResult<()> {
        match self.advance() {
            Some('"') => value.push('"'),
            Some('\\') => value.push('\\'),
            Some('/') => value.push('/'),
            Some('b') => value.push('\u{08}'),
            Some('f') => value.push('\u{0c}'),
            Some('n') => value.push('\n'),
            Some('r') => value.push('\r'),
            Some('t') => value.push('\t'),
            Some('u') => value.push(self.match_unicode_escape_sequence()?),
            Some(c) => {
                return lexer_error!(
                    ParserErrorDetails::InvalidEscapeSequence(format!("\\{}", c)),
                    self.coords
                )
            }
            None => return lexer_error!(ParserErrorDetails::EndOfInput, self.coords),
        }
        Ok(())
    }

    /// Match the four hex digits of a `\u` escape
    fn match_hex_quad(&mut self) -> ParserResult<u32> {
        let mut code = 0;
        for _ in 0..4 {
            match self.advance() {
                Some(c) => match c.to_digit(16) {
                    Some(digit) => code = code * 16 + digit,
                    None => {
                        return lexer_error!(
                            ParserErrorDetails::InvalidUnicodeEscapeSequence(format!(
                                "\\u{:04X}, then {:?}",
                                code, c
                            )),
                            self.coords
                        )
                    }
                },
                None => return lexer_error!(ParserErrorDetails::EndOfInput, self.coords),
            }
        }
        Ok(code)
    }

    /// Match a `\uXXXX` escape, combining UTF-16 surrogate pairs into a single scalar value
    fn match_unicode_escape_sequence(&mut self) -> ParserResult<char> {
        let high = self.match_hex_quad()?;
        let code = match high {
            0xD800..=0xDBFF => {
                if self.advance() != Some('\\') || self.advance() != Some('u') {
                    return lexer_error!(
                        ParserErrorDetails::InvalidUnicodeEscapeSequence(format!(
                            "\\u{:04X}",
                            high
                        )),
                        self.coords
                    );
                }
                let low = self.match_hex_quad()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return lexer_error!(
                        ParserErrorDetails::InvalidUnicodeEscapeSequence(format!(
                            "\\u{:04X}\\u{:04X}",
                            high, low
                        )),
                        self.coords
                    );
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            _ => high,
        };
        match char::from_u32(code) {
            Some(c) => Ok(c),
            None => lexer_error!(
                ParserErrorDetails::InvalidUnicodeEscapeSequence(format!("\\u{:04X}", high)),
                self.coords
            ),
        }
    }
}

#[cfg(feature = "mixed_numerics")]
fn parse_integer(repr: &str) -> Option<i64> {
    lexical::parse::<i64, _>(repr.as_bytes()).ok()
}

#[cfg(not(feature = "mixed_numerics"))]
fn parse_integer(repr: &str) -> Option<i64> {
    repr.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use crate::errors::ParserErrorDetails;
    use crate::lexer::{Lexer, Token};

    fn tokens(input: &str) -> Vec<Token> {
        let mut chars = input.chars();
        let mut lexer = Lexer::new(&mut chars);
        let mut tokens = vec![];
        loop {
            let (token, _) = lexer.consume().unwrap();
            if token == Token::EndOfInput {
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    fn first_error(input: &str) -> ParserErrorDetails {
        let mut chars = input.chars();
        let mut lexer = Lexer::new(&mut chars);
        loop {
            match lexer.consume() {
                Ok((Token::EndOfInput, _)) => panic!("no error for {:?}", input),
                Ok(_) => (),
                Err(err) => return err.details,
            }
        }
    }

    #[test]
    fn integers_that_overflow_should_become_floats() {
        assert_eq!(
            tokens("9223372036854775807 9223372036854775808"),
            vec![
                Token::Integer(i64::MAX),
                Token::Float(9223372036854775808.0)
            ]
        );
    }

    #[test]
    fn fractions_and_exponents_should_be_floats() {
        assert_eq!(
            tokens("-0 0.5 1e3 -2.5E-2"),
            vec![
                Token::Integer(0),
                Token::Float(0.5),
                Token::Float(1000.0),
                Token::Float(-0.025)
            ]
        );
    }

    #[test]
    fn surrogate_pairs_should_be_combined() {
        assert_eq!(
            tokens(r#""\ud83d\ude00 \u00e9""#),
            vec![Token::Str("\u{1F600} é".to_string())]
        );
    }

    #[test]
    fn lone_surrogates_should_be_rejected() {
        assert!(matches!(
            first_error(r#""\ud83d""#),
            ParserErrorDetails::InvalidUnicodeEscapeSequence(_)
        ));
        assert!(matches!(
            first_error(r#""\ude00""#),
            ParserErrorDetails::InvalidUnicodeEscapeSequence(_)
        ));
    }

    #[test]
    fn malformed_numbers_should_be_rejected() {
        for input in ["01", "-", "1.", "1e", "1.e5", "-a", "1e999"] {
            assert!(
                matches!(
                    first_error(input),
                    ParserErrorDetails::InvalidNumericRepresentation(_)
                ),
                "{}",
                input
            );
        }
    }

    #[test]
    fn raw_control_characters_should_be_rejected() {
        assert_eq!(
            first_error("\"a\tb\""),
            ParserErrorDetails::ControlCharacterInString('\t')
        );
    }
}
