use chisel_dom::coords::Coords;
use chisel_dom::errors::{ParserErrorDetails, ParserErrorSource};
use chisel_dom::lexer::{Lexer, Token};

fn tokens_with_coords(input: &str) -> Vec<(Token, Coords)> {
    let mut chars = input.chars();
    let mut lexer = Lexer::new(&mut chars);
    let mut tokens = vec![];
    loop {
        let (token, span) = lexer.consume().unwrap();
        let done = token == Token::EndOfInput;
        tokens.push((token, span.start));
        if done {
            break;
        }
    }
    tokens
}

fn tokens(input: &str) -> Vec<Token> {
    tokens_with_coords(input)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

#[test]
fn should_parse_basic_tokens() {
    assert_eq!(
        tokens("{}[],:"),
        [
            Token::StartObject,
            Token::EndObject,
            Token::StartArray,
            Token::EndArray,
            Token::Comma,
            Token::Colon,
            Token::EndOfInput
        ]
    );
}

#[test]
fn should_parse_null_and_booleans() {
    assert_eq!(
        tokens("null true    false\r\n\tnull"),
        [
            Token::Null,
            Token::Boolean(true),
            Token::Boolean(false),
            Token::Null,
            Token::EndOfInput
        ]
    );
}

#[test]
fn should_fail_on_mangled_literals() {
    let mut chars = "nulx".chars();
    let mut lexer = Lexer::new(&mut chars);
    let err = lexer.consume().unwrap_err();
    assert_eq!(err.source, ParserErrorSource::Lexer);
    assert!(matches!(err.details, ParserErrorDetails::MatchFailed(_, _)));
}

#[test]
fn should_parse_numbers() {
    assert_eq!(
        tokens("12345 -7 1.234 6.02e23 9007199254740993"),
        [
            Token::Integer(12345),
            Token::Integer(-7),
            Token::Float(1.234),
            Token::Float(6.02e23),
            Token::Integer(9007199254740993),
            Token::EndOfInput
        ]
    );
}

#[test]
fn should_decode_string_escapes() {
    assert_eq!(
        tokens(r#""a\"b" "\\\/\b\f\n\r\t" "Aé""#),
        [
            Token::Str("a\"b".to_string()),
            Token::Str("\\/\u{08}\u{0c}\n\r\t".to_string()),
            Token::Str("Aé".to_string()),
            Token::EndOfInput
        ]
    );
}

#[test]
fn should_fail_on_unknown_escapes() {
    let mut chars = r#""\x""#.chars();
    let mut lexer = Lexer::new(&mut chars);
    assert!(matches!(
        lexer.consume().unwrap_err().details,
        ParserErrorDetails::InvalidEscapeSequence(_)
    ));
}

#[test]
fn should_fail_on_unterminated_strings() {
    let mut chars = r#""rapidjson is awesome"#.chars();
    let mut lexer = Lexer::new(&mut chars);
    assert_eq!(
        lexer.consume().unwrap_err().details,
        ParserErrorDetails::EndOfInput
    );
}

#[test]
fn should_fail_on_invalid_characters() {
    let mut chars = "[1, @]".chars();
    let mut lexer = Lexer::new(&mut chars);
    for _ in 0..3 {
        lexer.consume().unwrap();
    }
    let err = lexer.consume().unwrap_err();
    assert_eq!(err.details, ParserErrorDetails::InvalidCharacter('@'));
    assert_eq!(err.coords.unwrap().column, 5);
}

#[test]
fn should_track_lines_and_columns() {
    let coords: Vec<(usize, usize)> = tokens_with_coords("{\n  \"a\": 1\n}")
        .into_iter()
        .map(|(_, coords)| (coords.line, coords.column))
        .collect();
    assert_eq!(coords[0], (1, 1));
    assert_eq!(coords[1], (2, 3));
    assert_eq!(coords[2], (2, 6));
    assert_eq!(coords[3], (2, 8));
    assert_eq!(coords[4], (3, 1));
}
