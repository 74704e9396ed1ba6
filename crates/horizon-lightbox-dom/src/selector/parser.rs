//! Selector parser using the `cssparser` crate.
//!
//! Whitespace is significant between compound selectors (it is the
//! descendant combinator), so the parser reads tokens with
//! `next_including_whitespace` and folds whitespace around explicit
//! combinators.

use std::str::FromStr;

use cssparser::{ParseError as CssParseError, Parser, ParserInput, Token};

use super::{
    AttributeMatch, AttributeSelector, Combinator, NthExpr, PseudoClass, Selector, SelectorList,
    SelectorPart, TypeSelector,
};
use crate::logging::targets;
use crate::{Error, Result};

/// Parse a comma-separated selector list.
///
/// # Example
///
/// ```
/// use horizon_lightbox_dom::selector::parse_selector_list;
///
/// let list = parse_selector_list("article img, svg[viewBox]").unwrap();
/// assert_eq!(list.selectors.len(), 2);
/// ```
pub fn parse_selector_list(source: &str) -> Result<SelectorList> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut selectors = vec![];

    loop {
        selectors.push(parse_complex_selector(&mut parser, source)?);

        match parser.next() {
            Ok(Token::Comma) => continue,
            Ok(token) => {
                return Err(Error::invalid_selector(
                    source,
                    format!("Unexpected token {:?}", token),
                ));
            }
            Err(_) => break,
        }
    }

    tracing::trace!(
        target: targets::SELECTOR,
        selector = source,
        count = selectors.len(),
        "parsed selector list"
    );
    Ok(SelectorList { selectors })
}

impl FromStr for SelectorList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_selector_list(s)
    }
}

/// Parse one complex selector, stopping before a top-level comma.
fn parse_complex_selector<'i>(parser: &mut Parser<'i, '_>, source: &str) -> Result<Selector> {
    let mut parts = vec![];
    let mut combinators = vec![];
    let mut current = SelectorPart::default();
    let mut pending: Option<Combinator> = None;

    parser.skip_whitespace();

    loop {
        let state = parser.state();
        let token = match parser.next_including_whitespace() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) => {
                if flush_part(&mut current, &mut parts) {
                    pending = Some(Combinator::Descendant);
                }
            }

            Token::Comma => {
                parser.reset(&state);
                break;
            }

            Token::Delim(c @ ('>' | '+' | '~')) => {
                flush_part(&mut current, &mut parts);
                if parts.is_empty() {
                    return Err(Error::invalid_selector(
                        source,
                        format!("Selector cannot start with '{}'", c),
                    ));
                }
                if matches!(pending, Some(p) if p != Combinator::Descendant) {
                    return Err(Error::invalid_selector(source, "Consecutive combinators"));
                }
                pending = Some(match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::AdjacentSibling,
                    _ => Combinator::GeneralSibling,
                });
            }

            token => {
                if current.is_empty() && !parts.is_empty() {
                    let combinator = pending.take().ok_or_else(|| {
                        Error::invalid_selector(source, "Missing combinator between selectors")
                    })?;
                    combinators.push(combinator);
                }
                parse_simple_selector(parser, token, &mut current, source)?;
            }
        }
    }

    flush_part(&mut current, &mut parts);

    if matches!(pending, Some(p) if p != Combinator::Descendant) {
        return Err(Error::invalid_selector(source, "Dangling combinator"));
    }

    if parts.is_empty() {
        return Err(Error::invalid_selector(source, "Empty selector"));
    }

    Ok(Selector { parts, combinators })
}

fn flush_part(current: &mut SelectorPart, parts: &mut Vec<SelectorPart>) -> bool {
    if current.is_empty() {
        return false;
    }
    parts.push(std::mem::take(current));
    true
}

/// Apply one simple-selector token to the compound being built.
fn parse_simple_selector<'i>(
    parser: &mut Parser<'i, '_>,
    token: Token<'i>,
    part: &mut SelectorPart,
    source: &str,
) -> Result<()> {
    match token {
        Token::Ident(name) => {
            if !part.is_empty() {
                return Err(Error::invalid_selector(
                    source,
                    format!("Type selector '{}' must come first in a compound", name),
                ));
            }
            part.type_selector = Some(TypeSelector::Type(name.to_string()));
        }

        Token::Delim('*') => {
            if !part.is_empty() {
                return Err(Error::invalid_selector(
                    source,
                    "Universal selector must come first in a compound",
                ));
            }
            part.type_selector = Some(TypeSelector::Universal);
        }

        Token::Delim('.') => {
            let class = parser
                .expect_ident()
                .map_err(|_| Error::invalid_selector(source, "Expected class name after '.'"))?;
            part.classes.push(class.to_string());
        }

        Token::IDHash(id) => {
            if part.id.is_some() {
                return Err(Error::invalid_selector(source, "Duplicate ID selector"));
            }
            part.id = Some(id.to_string());
        }

        Token::SquareBracketBlock => {
            let attribute = parser
                .parse_nested_block(|p| parse_attribute(p))
                .map_err(|_: CssParseError<'_, ()>| {
                    Error::invalid_selector(source, "Invalid attribute selector")
                })?;
            part.attributes.push(attribute);
        }

        Token::Colon => {
            let pseudo = parse_pseudo_class(parser, source)?;
            part.pseudo_classes.push(pseudo);
        }

        other => {
            return Err(Error::invalid_selector(
                source,
                format!("Unexpected token {:?}", other),
            ));
        }
    }

    Ok(())
}

/// Parse the contents of `[...]`.
fn parse_attribute<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<AttributeSelector, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    let name = parser.expect_ident()?.to_string();

    let operator = match parser.next() {
        Ok(token) => token.clone(),
        Err(_) => return Ok(AttributeSelector::exists(name)),
    };

    let make: fn(String) -> AttributeMatch = match operator {
        Token::Delim('=') => AttributeMatch::Equals,
        Token::IncludeMatch => AttributeMatch::Includes,
        Token::DashMatch => AttributeMatch::DashMatch,
        Token::PrefixMatch => AttributeMatch::Prefix,
        Token::SuffixMatch => AttributeMatch::Suffix,
        Token::SubstringMatch => AttributeMatch::Substring,
        _ => return Err(parser.new_custom_error(())),
    };

    let value = match parser.next()?.clone() {
        Token::Ident(value) | Token::QuotedString(value) => value.to_string(),
        _ => return Err(parser.new_custom_error(())),
    };

    parser.expect_exhausted()?;

    Ok(AttributeSelector {
        name,
        operation: make(value),
    })
}

/// Parse a pseudo-class after its leading ':'.
fn parse_pseudo_class<'i>(parser: &mut Parser<'i, '_>, source: &str) -> Result<PseudoClass> {
    let token = parser
        .next_including_whitespace()
        .map(|t| t.clone())
        .map_err(|_| Error::invalid_selector(source, "Expected pseudo-class name after ':'"))?;

    match token {
        Token::Ident(name) => PseudoClass::from_css(&name).ok_or_else(|| {
            Error::invalid_selector(source, format!("Unknown pseudo-class ':{}'", name))
        }),

        Token::Function(name) if name.eq_ignore_ascii_case("nth-child") => {
            let expr = parser
                .parse_nested_block(|p| parse_nth_expr(p))
                .map_err(|_: CssParseError<'_, ()>| {
                    Error::invalid_selector(source, "Invalid nth-child expression")
                })?;
            Ok(PseudoClass::NthChild(expr))
        }

        Token::Function(name) if name.eq_ignore_ascii_case("not") => {
            let inner = parser
                .parse_nested_block(|p| {
                    parse_compound_argument(p, source).map_err(|_| p.new_custom_error(()))
                })
                .map_err(|_: CssParseError<'_, ()>| {
                    Error::invalid_selector(source, "Invalid :not() argument")
                })?;
            Ok(PseudoClass::Not(Box::new(inner)))
        }

        Token::Function(name) => Err(Error::invalid_selector(
            source,
            format!("Unknown pseudo-class ':{}()'", name),
        )),

        _ => Err(Error::invalid_selector(
            source,
            "Expected pseudo-class name after ':'",
        )),
    }
}

/// Parse a single compound selector (the argument of `:not()`).
fn parse_compound_argument<'i>(parser: &mut Parser<'i, '_>, source: &str) -> Result<SelectorPart> {
    let mut part = SelectorPart::default();
    parser.skip_whitespace();

    while let Ok(token) = parser.next_including_whitespace() {
        let token = token.clone();
        if matches!(token, Token::WhiteSpace(_)) {
            break;
        }
        parse_simple_selector(parser, token, &mut part, source)?;
    }

    parser.skip_whitespace();
    if !parser.is_exhausted() || part.is_empty() {
        return Err(Error::invalid_selector(
            source,
            ":not() takes exactly one compound selector",
        ));
    }

    Ok(part)
}

/// Parse nth-child expression (e.g., "odd", "even", "3", "2n+1", "3n-2").
fn parse_nth_expr<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<NthExpr, CssParseError<'i, ()>> {
    parser.skip_whitespace();

    let expr = match parser.next()?.clone() {
        Token::Ident(name) => match name.to_ascii_lowercase().as_str() {
            "odd" => NthExpr::odd(),
            "even" => NthExpr::even(),
            "n" => NthExpr::all(),
            _ => return Err(parser.new_custom_error(())),
        },
        Token::Number {
            int_value: Some(b), ..
        } => NthExpr::new(0, b),
        Token::Dimension {
            int_value: Some(a),
            unit,
            ..
        } => {
            let unit = unit.to_ascii_lowercase();
            if unit == "n" {
                // "2n", "2n+1" (the "+1" tokenizes as a signed number)
                let next = parser.next().map(|t| t.clone());
                let b = match next {
                    Ok(Token::Number {
                        int_value: Some(b),
                        has_sign: true,
                        ..
                    }) => b,
                    Ok(_) => return Err(parser.new_custom_error(())),
                    Err(_) => 0,
                };
                NthExpr::new(a, b)
            } else if let Some(offset) = unit.strip_prefix("n-") {
                // "3n-2" tokenizes as a dimension with unit "n-2"
                let b = offset
                    .parse::<i32>()
                    .ok()
                    .and_then(i32::checked_neg)
                    .ok_or_else(|| parser.new_custom_error(()))?;
                NthExpr::new(a, b)
            } else {
                return Err(parser.new_custom_error(()));
            }
        }
        _ => return Err(parser.new_custom_error(())),
    };

    parser.expect_exhausted()?;
    Ok(expr)
}
