use chumsky::prelude::*;
use chumsky::Stream;

use crate::ast::FormulaExpr;
use crate::errors::{to_parse_error, ParseError};
use crate::lexer::lexer;
use crate::tokens::{Number, Token};

#[derive(Debug, Clone, Copy)]
enum FuncKind {
    Min,
    Max,
}

pub fn parse_formula(source: &str) -> Result<FormulaExpr, Vec<ParseError>> {
    let (tokens, lex_errs) = lexer().parse_recovery(source);
    if !lex_errs.is_empty() {
        return Err(lex_errs.into_iter().map(to_parse_error).collect());
    }

    let tokens = tokens.unwrap_or_default();
    let span_end = source.len()..source.len() + 1;
    let stream = Stream::from_iter(span_end, tokens.into_iter());

    expr_parser()
        .then_ignore(end())
        .parse(stream)
        .map_err(|errs| errs.into_iter().map(to_parse_error).collect())
}

fn expr_parser() -> impl Parser<Token, FormulaExpr, Error = Simple<Token>> {
    recursive(|expr| {
        let number = select! { Token::Number(Number(n)) => FormulaExpr::Number { value: n } };
        let field = select! { Token::Path(p) => FormulaExpr::FieldRef { path: p } };

        let func = choice::<_, Simple<Token>>((
            just(Token::KwMin).to(FuncKind::Min),
            just(Token::KwMax).to(FuncKind::Max),
        ))
        .then(
            expr.clone()
                .then_ignore(just(Token::Comma))
                .then(expr.clone())
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        )
        .map(|(kind, (left, right))| match kind {
            FuncKind::Min => FormulaExpr::Min {
                left: Box::new(left),
                right: Box::new(right),
            },
            FuncKind::Max => FormulaExpr::Max {
                left: Box::new(left),
                right: Box::new(right),
            },
        });

        let atom = choice((
            func,
            number,
            field,
            expr.delimited_by(just(Token::LParen), just(Token::RParen)),
        ));

        let unary = just(Token::Minus)
            .repeated()
            .then(atom)
            .map(|(negs, inner)| {
                negs.into_iter().fold(inner, |acc, _| FormulaExpr::Neg {
                    expr: Box::new(acc),
                })
            });

        let product = unary
            .clone()
            .then(
                choice::<_, Simple<Token>>((
                    just(Token::Star).to(ProductOp::Multiply),
                    just(Token::Slash).to(ProductOp::Divide),
                ))
                .then(unary)
                .repeated(),
            )
            .foldl(|left, (op, right)| match op {
                ProductOp::Multiply => FormulaExpr::Multiply {
                    left: Box::new(left),
                    right: Box::new(right),
                },
                ProductOp::Divide => FormulaExpr::Divide {
                    left: Box::new(left),
                    right: Box::new(right),
                },
            });

        product
            .clone()
            .then(
                choice::<_, Simple<Token>>((
                    just(Token::Plus).to(SumOp::Add),
                    just(Token::Minus).to(SumOp::Subtract),
                ))
                .then(product)
                .repeated(),
            )
            .foldl(|left, (op, right)| match op {
                SumOp::Add => FormulaExpr::Add {
                    left: Box::new(left),
                    right: Box::new(right),
                },
                SumOp::Subtract => FormulaExpr::Subtract {
                    left: Box::new(left),
                    right: Box::new(right),
                },
            })
    })
}

#[derive(Debug, Clone, Copy)]
enum ProductOp {
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Copy)]
enum SumOp {
    Add,
    Subtract,
}
