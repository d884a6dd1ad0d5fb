use logos::Logos;
use std::fmt;

/// Most dice a single `NdM` term may roll.
pub const MAX_DICE_PER_TERM: u32 = 1000;

/// Token type for dice formulas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Integer literal.
    Number(i64),
    /// Dice term `NdM`; a missing `N` means one die.
    Dice {
        /// How many dice.
        count: u32,
        /// Sides per die.
        sides: u32,
    },
    /// Roll-data variable `@a.b.c`, stored without the `@`.
    Variable(String),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Dice { count, sides } => write!(f, "{count}d{sides}"),
            Token::Variable(path) => write!(f, "@{path}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[regex(r"[0-9]*[dD][0-9]+")]
    Dice,

    #[regex(r"[0-9]+")]
    Number,

    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z0-9_]+)*")]
    Variable,
}

/// A lexer error with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Byte range of the erroneous input in the source.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the lexer error.
    pub message: String,
}

/// Lex a formula into `(Token, Span)` pairs, collecting every error.
pub fn lex(source: &str) -> (Vec<(Token, std::ops::Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = match result {
            Ok(RawToken::Plus) => Token::Plus,
            Ok(RawToken::Minus) => Token::Minus,
            Ok(RawToken::Star) => Token::Star,
            Ok(RawToken::Slash) => Token::Slash,
            Ok(RawToken::LParen) => Token::LParen,
            Ok(RawToken::RParen) => Token::RParen,
            Ok(RawToken::Variable) => Token::Variable(lexer.slice()[1..].to_string()),
            Ok(RawToken::Number) => match lexer.slice().parse::<i64>() {
                Ok(n) => Token::Number(n),
                Err(_) => {
                    errors.push(LexError {
                        span: span.clone(),
                        message: format!("number too large: {}", lexer.slice()),
                    });
                    continue;
                }
            },
            Ok(RawToken::Dice) => match dice_term(lexer.slice()) {
                Ok(token) => token,
                Err(message) => {
                    errors.push(LexError {
                        span: span.clone(),
                        message,
                    });
                    continue;
                }
            },
            Err(()) => {
                errors.push(LexError {
                    span: span.clone(),
                    message: format!("unexpected character: {:?}", &source[span.clone()]),
                });
                continue;
            }
        };
        tokens.push((token, span));
    }

    (tokens, errors)
}

fn dice_term(slice: &str) -> Result<Token, String> {
    let Some(split) = slice.find(['d', 'D']) else {
        return Err(format!("invalid dice term: {slice}"));
    };
    let (count, sides) = (&slice[..split], &slice[split + 1..]);
    let count = if count.is_empty() {
        1
    } else {
        count
            .parse::<u32>()
            .map_err(|_| format!("too many dice: {slice}"))?
    };
    let sides = sides
        .parse::<u32>()
        .map_err(|_| format!("too many sides: {slice}"))?;

    if sides == 0 {
        return Err(format!("dice need at least one side: {slice}"));
    }
    if count > MAX_DICE_PER_TERM {
        return Err(format!(
            "at most {MAX_DICE_PER_TERM} dice per term, got {count}"
        ));
    }
    Ok(Token::Dice { count, sides })
}
