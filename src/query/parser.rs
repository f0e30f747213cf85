use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_while1};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{all_consuming, map, value};
use nom::error::{Error as NomError, ErrorKind as NomErrorKind};
use nom::multi::many0;
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};
use serde_json::Value;
use crate::core::error::{Error, ErrorKind, Result};
use crate::query::ast::{Condition, FilterExpr, FilterOperator};

/// Parser for the `filter` request parameter.
///
/// String grammar:
/// - `genre = adventure`, `genre != "science fiction"`
/// - `a = 1 AND (b = 2 OR NOT c = 3)`; NOT binds tighter than AND, AND than OR
///
/// JSON shapes: a string, or an array of strings which are ANDed together.
/// An array containing arrays is an OR of its items, each inner array of
/// strings being an AND group.
pub struct FilterParser;

impl FilterParser {
    /// `Ok(None)` for an absent or empty filter.
    pub fn parse_value(filter: &Value) -> Result<Option<FilterExpr>> {
        match filter {
            Value::Null => Ok(None),
            Value::String(s) => Self::parse_str(s),
            Value::Array(items) if items.iter().any(Value::is_array) => {
                let mut alternatives = Vec::new();
                for item in items {
                    let alternative = match item {
                        Value::String(s) => Self::parse_str(s)?,
                        Value::Array(group) => Self::parse_and_group(group)?,
                        other => return Err(shape_error(other)),
                    };
                    alternatives.extend(alternative);
                }
                Ok((!alternatives.is_empty()).then(|| FilterExpr::or(alternatives)))
            }
            Value::Array(items) => Self::parse_and_group(items),
            other => Err(shape_error(other)),
        }
    }

    pub fn parse_str(input: &str) -> Result<Option<FilterExpr>> {
        if input.trim().is_empty() {
            return Ok(None);
        }

        match all_consuming(delimited(multispace0, expression, multispace0)).parse(input) {
            Ok((_, expr)) => Ok(Some(expr)),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(Error::new(
                ErrorKind::InvalidFilterSyntax,
                format!("invalid filter `{}`: unexpected input at `{}`", input, e.input),
            )),
            Err(nom::Err::Incomplete(_)) => Err(Error::new(
                ErrorKind::InvalidFilterSyntax,
                format!("invalid filter `{}`: unexpected end of input", input),
            )),
        }
    }

    fn parse_and_group(group: &[Value]) -> Result<Option<FilterExpr>> {
        let mut clauses = Vec::new();
        for item in group {
            match item {
                Value::String(s) => clauses.extend(Self::parse_str(s)?),
                other => return Err(shape_error(other)),
            }
        }
        Ok((!clauses.is_empty()).then(|| FilterExpr::and(clauses)))
    }
}

fn shape_error(value: &Value) -> Error {
    Error::new(
        ErrorKind::InvalidFilterSyntax,
        format!("filter must be a string or an array of strings and arrays of strings, found `{}`", value),
    )
}

fn expression(input: &str) -> IResult<&str, FilterExpr> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(keyword("OR"), and_expr)).parse(input)?;
    Ok((input, join(first, rest, FilterExpr::or)))
}

fn and_expr(input: &str) -> IResult<&str, FilterExpr> {
    let (input, first) = not_expr(input)?;
    let (input, rest) = many0(preceded(keyword("AND"), not_expr)).parse(input)?;
    Ok((input, join(first, rest, FilterExpr::and)))
}

fn not_expr(input: &str) -> IResult<&str, FilterExpr> {
    alt((
        map(preceded((tag_no_case("NOT"), multispace1), not_expr), |e| FilterExpr::Not(Box::new(e))),
        primary,
    ))
    .parse(input)
}

fn primary(input: &str) -> IResult<&str, FilterExpr> {
    alt((
        delimited((char('('), multispace0), expression, (multispace0, char(')'))),
        condition,
    ))
    .parse(input)
}

fn condition(input: &str) -> IResult<&str, FilterExpr> {
    let (input, field) = operand(input)?;
    let (input, operator) = delimited(
        multispace0,
        alt((
            value(FilterOperator::NotEqual, tag("!=")),
            value(FilterOperator::Equal, tag("=")),
        )),
        multispace0,
    )
    .parse(input)?;
    let (input, value) = operand(input)?;
    Ok((input, FilterExpr::Condition(Condition { field, operator, value })))
}

fn operand(input: &str) -> IResult<&str, String> {
    alt((quoted, map(take_while1(is_bare_char), String::from))).parse(input)
}

fn is_bare_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '=' | '!' | '"' | '\'')
}

/// Single or double quoted string; backslash escapes the next character.
fn quoted(input: &str) -> IResult<&str, String> {
    let mut chars = input.char_indices();
    let quote = match chars.next() {
        Some((_, c @ ('"' | '\''))) => c,
        _ => return Err(nom::Err::Error(NomError::new(input, NomErrorKind::Char))),
    };

    let mut out = String::new();
    let mut escaped = false;
    for (i, c) in chars {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Ok((&input[i + c.len_utf8()..], out));
        } else {
            out.push(c);
        }
    }

    // Unterminated quote: no other branch can succeed either
    Err(nom::Err::Failure(NomError::new(input, NomErrorKind::Char)))
}

fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = NomError<&'a str>> {
    delimited(multispace1, tag_no_case(word), multispace1)
}

fn join(first: FilterExpr, rest: Vec<FilterExpr>, combine: fn(Vec<FilterExpr>) -> FilterExpr) -> FilterExpr {
    if rest.is_empty() {
        return first;
    }
    let mut all = Vec::with_capacity(rest.len() + 1);
    all.push(first);
    all.extend(rest);
    combine(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eq(field: &str, value: &str) -> FilterExpr {
        FilterExpr::condition(field, FilterOperator::Equal, value)
    }

    #[test]
    fn test_simple_equality() {
        assert_eq!(FilterParser::parse_str("genre = adventure").unwrap(), Some(eq("genre", "adventure")));
        assert_eq!(FilterParser::parse_str("genre=fantasy").unwrap(), Some(eq("genre", "fantasy")));
        assert_eq!(
            FilterParser::parse_str("genre != romance").unwrap(),
            Some(FilterExpr::condition("genre", FilterOperator::NotEqual, "romance"))
        );
    }

    #[test]
    fn test_quoted_values() {
        assert_eq!(
            FilterParser::parse_str(r#"title = "Le Petit Prince""#).unwrap(),
            Some(eq("title", "Le Petit Prince"))
        );
        assert_eq!(
            FilterParser::parse_str(r"title = 'The Hitchhiker\'s Guide'").unwrap(),
            Some(eq("title", "The Hitchhiker's Guide"))
        );
    }

    #[test]
    fn test_precedence() {
        let expr = FilterParser::parse_str("a = 1 OR b = 2 AND NOT c = 3").unwrap().unwrap();
        assert_eq!(
            expr,
            FilterExpr::Or(vec![
                eq("a", "1"),
                FilterExpr::And(vec![eq("b", "2"), FilterExpr::Not(Box::new(eq("c", "3")))]),
            ])
        );
    }

    #[test]
    fn test_parentheses() {
        let expr = FilterParser::parse_str("(a = 1 OR b = 2) AND c = 3").unwrap().unwrap();
        assert_eq!(
            expr,
            FilterExpr::And(vec![FilterExpr::Or(vec![eq("a", "1"), eq("b", "2")]), eq("c", "3")])
        );
    }

    #[test]
    fn test_array_shapes() {
        let expr = FilterParser::parse_value(&json!(["genre = fantasy"])).unwrap();
        assert_eq!(expr, Some(eq("genre", "fantasy")));

        let expr = FilterParser::parse_value(&json!(["genre = fantasy", "id = 4"])).unwrap();
        assert_eq!(expr, Some(FilterExpr::And(vec![eq("genre", "fantasy"), eq("id", "4")])));

        let expr = FilterParser::parse_value(&json!([["genre = romance", "id = 2"], ["genre = fantasy"]])).unwrap();
        assert_eq!(
            expr,
            Some(FilterExpr::Or(vec![
                FilterExpr::And(vec![eq("genre", "romance"), eq("id", "2")]),
                eq("genre", "fantasy"),
            ]))
        );

        let expr = FilterParser::parse_value(&json!([["genre = romance", "id = 2"], "id = 4"])).unwrap();
        assert_eq!(
            expr,
            Some(FilterExpr::Or(vec![
                FilterExpr::And(vec![eq("genre", "romance"), eq("id", "2")]),
                eq("id", "4"),
            ]))
        );

        assert_eq!(FilterParser::parse_value(&json!([])).unwrap(), None);
        assert_eq!(FilterParser::parse_value(&json!("  ")).unwrap(), None);
    }

    #[test]
    fn test_syntax_errors() {
        for bad in ["genre adventure", "genre = ", "(genre = a", "genre = 'open", "= a", "a = 1 AND"] {
            let err = FilterParser::parse_str(bad).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidFilterSyntax, "{}", bad);
        }

        let err = FilterParser::parse_value(&json!(42)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFilterSyntax);
        let err = FilterParser::parse_value(&json!([["a = 1", 3]])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFilterSyntax);
    }
}
