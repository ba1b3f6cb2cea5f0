// tests/lexer_tests.rs

use aggregate_compiler::ast::Token;
use aggregate_compiler::lexer::{LexError, Lexer, Position};

fn tokens(input: &str) -> Vec<Token> {
    Lexer::new(input)
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|t| t.token)
        .collect()
}

// ============================================================================
// Single Tokens
// ============================================================================

#[test]
fn test_punctuation() {
    let test_cases = vec![
        (".", Token::Dot),
        (",", Token::Comma),
        (":", Token::Colon),
        (";", Token::Semicolon),
        ("(", Token::LParen),
        (")", Token::RParen),
        ("{", Token::LBrace),
        ("}", Token::RBrace),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        ("?", Token::Question),
        ("=>", Token::Arrow),
        ("=", Token::Assign),
    ];

    for (input, expected) in test_cases {
        assert_eq!(tokens(input), vec![expected, Token::Eof], "input: {}", input);
    }
}

#[test]
fn test_operators() {
    let test_cases = vec![
        ("+", Token::Plus),
        ("-", Token::Minus),
        ("*", Token::Star),
        ("/", Token::Slash),
        ("%", Token::Percent),
        ("===", Token::StrictEq),
        ("!==", Token::StrictNotEq),
        ("==", Token::LooseEq),
        ("!=", Token::LooseNotEq),
        ("<", Token::Lt),
        (">", Token::Gt),
        ("<=", Token::LtEq),
        (">=", Token::GtEq),
        ("!", Token::Exclamation),
        ("&&", Token::AndAnd),
        ("||", Token::OrOr),
    ];

    for (input, expected) in test_cases {
        assert_eq!(tokens(input), vec![expected, Token::Eof], "input: {}", input);
    }
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    assert_eq!(tokens("42"), vec![Token::Integer(42), Token::Eof]);
    assert_eq!(tokens("3.25"), vec![Token::Float(3.25), Token::Eof]);
    assert_eq!(tokens("1e3"), vec![Token::Float(1000.0), Token::Eof]);
    assert_eq!(tokens("2.5E-1"), vec![Token::Float(0.25), Token::Eof]);
}

#[test]
fn test_integer_overflow_becomes_float() {
    assert_eq!(
        tokens("99999999999999999999"),
        vec![Token::Float(1e20), Token::Eof]
    );
}

#[test]
fn test_number_followed_by_member_access() {
    assert_eq!(
        tokens("1.x"),
        vec![
            Token::Integer(1),
            Token::Dot,
            Token::Identifier("x".to_string()),
            Token::Eof
        ]
    );
}

#[test]
fn test_strings() {
    assert_eq!(
        tokens(r#""hello" 'world'"#),
        vec![
            Token::String("hello".to_string()),
            Token::String("world".to_string()),
            Token::Eof
        ]
    );
    assert_eq!(
        tokens(r#""a\"b\n\\""#),
        vec![Token::String("a\"b\n\\".to_string()), Token::Eof]
    );
}

#[test]
fn test_identifiers_allow_dollar() {
    assert_eq!(
        tokens("$addFields _private this"),
        vec![
            Token::Identifier("$addFields".to_string()),
            Token::Identifier("_private".to_string()),
            Token::Identifier("this".to_string()),
            Token::Eof
        ]
    );
}

// ============================================================================
// Trivia and errors
// ============================================================================

#[test]
fn test_multiline_block_comment() {
    assert_eq!(
        tokens("a // line\n/* block\n comment */ b"),
        vec![
            Token::Identifier("a".to_string()),
            Token::Identifier("b".to_string()),
            Token::Eof
        ]
    );
}

#[test]
fn test_unexpected_character() {
    let err = Lexer::new("this.a # 1").tokenize().unwrap_err();
    assert_eq!(
        err,
        LexError::UnexpectedChar {
            ch: '#',
            position: Position { line: 1, column: 8 }
        }
    );
}

#[test]
fn test_lex_errors() {
    assert!(matches!(
        Lexer::new("'open").tokenize(),
        Err(LexError::UnterminatedString { .. })
    ));
    assert!(matches!(
        Lexer::new(r#""\q""#).tokenize(),
        Err(LexError::InvalidEscape { ch: 'q', .. })
    ));
    assert!(matches!(
        Lexer::new("12abc").tokenize(),
        Err(LexError::InvalidNumber { .. })
    ));
    assert!(matches!(
        Lexer::new("/* never closed").tokenize(),
        Err(LexError::UnterminatedComment { .. })
    ));
}

#[test]
fn test_span_slices_source() {
    let source = "this.foo";
    let spanned = Lexer::new(source).tokenize().unwrap();
    let slices: Vec<_> = spanned.iter().map(|t| t.span.slice(source)).collect();
    assert_eq!(slices, vec!["this", ".", "foo", ""]);
}
