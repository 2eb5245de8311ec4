use logos::Logos;

/// JavaScript tokens, as far as feature detection needs them.
///
/// Comments are skipped and string/template bodies are single tokens, so
/// text inside them never looks like syntax. Regex literals are not
/// recognised; their bodies lex as ordinary punctuation.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f\u{FEFF}]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
#[logos(skip r"#![^\n]*")]
pub enum Token {
    // Punctuation
    #[token("=>")]
    FatArrow,

    #[token("...")]
    Ellipsis,

    #[token("?.")]
    OptionalChain,

    #[token("??")]
    Nullish,

    #[token("??=")]
    NullishAssign,

    #[token("||=")]
    OrAssign,

    #[token("&&=")]
    AndAssign,

    #[token("**")]
    Exponent,

    #[token("**=")]
    ExponentAssign,

    #[token("*")]
    Star,

    #[token(".")]
    Dot,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[regex(r"[-+/%&|^!~<>=?:]")]
    Operator,

    // Literals
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    StringLiteral,

    #[regex(r"`([^`\\]|\\.)*`")]
    Template,

    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?n?", |lex| lex.slice().to_string())]
    #[regex(r"0[xXoObB][0-9a-fA-F_]+n?", |lex| lex.slice().to_string())]
    Number(String),

    // Names
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"#[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    PrivateName(String),
}

/// A token with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

/// Tokenize `source`, dropping anything the lexer cannot classify.
///
/// Never fails: feature detection is heuristic and a stray byte should
/// not hide the features around it.
pub fn tokenize(source: &str) -> Vec<Spanned> {
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect();

    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        if let Ok(token) = result {
            let start = lexer.span().start;
            let line = match line_starts.binary_search(&start) {
                Ok(idx) => idx + 1,
                Err(idx) => idx,
            };
            tokens.push(Spanned { token, line });
        }
    }
    tokens
}
