use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::ast::{BinOp, Expr};
use super::lexer::Token;

type Span = SimpleSpan;

/// Parse error with source span.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Byte range of the offending input.
    pub span: std::ops::Range<usize>,
    /// Human-readable description.
    pub message: String,
}

/// Arithmetic over dice, numbers and variables with the usual precedence:
/// unary signs bind tightest, then `*` and `/`, then `+` and `-`, all left
/// associative.
fn formula_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    recursive(|expr| {
        let term = select! {
            Token::Number(n) => Expr::Number(n),
            Token::Dice { count, sides } => Expr::Dice { count, sides },
            Token::Variable(path) => Expr::Variable(path),
        }
        .labelled("number, dice or variable");

        let atom = term.or(expr.delimited_by(just(Token::LParen), just(Token::RParen)));

        let unary = just(Token::Minus)
            .to(true)
            .or(just(Token::Plus).to(false))
            .repeated()
            .foldr(atom, |negate, rhs| {
                if negate {
                    Expr::Neg(Box::new(rhs))
                } else {
                    rhs
                }
            });

        let product = unary.clone().foldl(
            just(Token::Star)
                .to(BinOp::Mul)
                .or(just(Token::Slash).to(BinOp::Div))
                .then(unary)
                .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        );

        product.clone().foldl(
            just(Token::Plus)
                .to(BinOp::Add)
                .or(just(Token::Minus).to(BinOp::Sub))
                .then(product)
                .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        )
    })
    .then_ignore(end())
}

/// Parse a token stream into an expression tree.
pub fn parse(tokens: &[(Token, std::ops::Range<usize>)]) -> Result<Expr, Vec<ParseError>> {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = formula_parser().parse(stream).into_output_errors();

    match output {
        Some(expr) if errors.is_empty() => Ok(expr),
        _ => Err(errors
            .into_iter()
            .map(|e| ParseError {
                span: e.span().into_range(),
                message: e.to_string(),
            })
            .collect()),
    }
}
