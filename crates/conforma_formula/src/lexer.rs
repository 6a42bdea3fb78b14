use chumsky::prelude::*;

use crate::tokens::{Number, Token};

pub(crate) fn lexer(
) -> impl Parser<char, Vec<(Token, std::ops::Range<usize>)>, Error = Simple<char>> {
    let number = text::int(10)
        .then(just('.').then(text::digits(10)).or_not())
        .try_map(|(int_part, frac), span| {
            let mut s = int_part;
            if let Some((dot, frac)) = frac {
                s.push(dot);
                s.push_str(&frac);
            }
            s.parse::<f64>()
                .map_err(|_| Simple::custom(span, "invalid number literal"))
        })
        .map(|value| Token::Number(Number::new(value)));

    // A field path is a dotted identifier chain: `electrical.contractedPower`.
    let symbol = filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .map(Some)
        .chain::<char, _, _>(
            filter(|c: &char| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.')).repeated(),
        )
        .collect::<String>();
    let path = symbol.clone().map(Token::Path);

    let make_keyword = |word: &'static str, token: Token| {
        symbol.clone().try_map(move |raw: String, span| {
            if raw == word {
                Ok(token.clone())
            } else {
                Err(Simple::expected_input_found(span, None, None))
            }
        })
    };
    let keyword = choice::<_, Simple<char>>((
        make_keyword("min", Token::KwMin),
        make_keyword("max", Token::KwMax),
    ));

    let op = choice::<_, Simple<char>>(vec![
        just("+").to(Token::Plus).boxed(),
        just("-").to(Token::Minus).boxed(),
        just("*").to(Token::Star).boxed(),
        just("/").to(Token::Slash).boxed(),
        just("(").to(Token::LParen).boxed(),
        just(")").to(Token::RParen).boxed(),
        just(",").to(Token::Comma).boxed(),
    ]);

    choice::<_, Simple<char>>((keyword, number, op, path))
        .map_with_span(|tok, span| (tok, span))
        .padded()
        .repeated()
        .then_ignore(end())
}
