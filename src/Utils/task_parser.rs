/// Parsers for the small text formats the engine reads.
///
/// Task documents look like `" title1 key1: value1, value2 key2: value3 title2 key3: value4"`:
/// titled sections holding keys with comma-separated value lists. They carry the engine
/// configuration (section `engine`) and default variable bindings (section `bindings`).
///
/// Binding strings look like `"x=pi;y=2.34;z=x*y"` and variable lists like `"x;y"`.
use crate::symbolic::errors::SyntaxError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till1, take_while1},
    character::complete::{alpha1, alphanumeric1, char, multispace0, space0},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::{many0, many1, separated_list0, separated_list1},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;

pub type SectionMap = HashMap<String, Vec<Value>>;
pub type DocumentMap = HashMap<String, SectionMap>;

/// one entry of a value list
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn as_string(&self) -> Option<&String> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// integers widen to floats
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn to_string_value(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(f) => f.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Boolean(b) => b.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_value())
    }
}

/// identifier: a letter or `_`, then letters, digits and `_`
fn identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    map(parser, String::from).parse(input)
}

/// section title, trailing whitespace dropped
pub(crate) fn parse_title(input: &str) -> IResult<&str, String> {
    let (input, result) = identifier(input)?;
    Ok((input.trim(), result))
}

pub(crate) fn parse_key(input: &str) -> IResult<&str, String> {
    identifier(input)
}

/// single value: everything up to a comma, whitespace or semicolon
pub(crate) fn parse_value(input: &str) -> IResult<&str, Value> {
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\n' | '\r' | ';'));
    map_res(value_parser, |s: &str| -> Result<Value, String> {
        if let Ok(val) = s.parse::<i64>() {
            Ok(Value::Integer(val))
        } else if let Ok(val) = s.parse::<f64>() {
            Ok(Value::Float(val))
        } else if let Ok(val) = s.parse::<bool>() {
            Ok(Value::Boolean(val))
        } else {
            Ok(Value::String(s.to_string()))
        }
    })
    .parse(input)
}

pub(crate) fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let (input, _) = space0(input)?;
    let separator_comma = delimited(space0, tag(","), space0);
    separated_list0(separator_comma, parse_value).parse(input)
}

/// `key: v1, v2`
pub(crate) fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let (input, result) = separated_pair(parse_key, colon_separator, parse_value_list).parse(input)?;
    Ok((input.trim(), result))
}

/// a title followed by at least one key-value pair
pub(crate) fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_title(input)?;
    let (input, _) = multispace0(input)?;
    let (input, pairs) = many1(terminated(parse_key_value_pair, space0)).parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// drops blank lines and lines starting with `//`, `#` or `%`
pub(crate) fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

pub fn parse_document(input: &str) -> IResult<&str, DocumentMap> {
    let (input, sections) =
        many1(delimited(space0, parse_section, multispace0)).parse(input)?;
    Ok((input, sections.into_iter().collect()))
}

/// Parses a whole document, comments allowed. Text left over after the last section is
/// an error.
pub fn parse_document_as(input: &str) -> Result<DocumentMap, String> {
    let filtered = filter_comments(input);
    if filtered.trim().is_empty() {
        return Ok(DocumentMap::new());
    }
    match parse_document(filtered.trim_start()) {
        Ok((remaining, parsed)) => {
            if !remaining.trim().is_empty() {
                return Err(format!(
                    "Failed to parse entire document. Remaining: '{}'",
                    remaining
                ));
            }
            Ok(parsed)
        }
        Err(e) => Err(format!("Parsing error: {:?}", e)),
    }
}

//___________________________________BINDINGS AND VARIABLE LISTS____________________________________

/// `name=expression`, the expression running up to the next `;`
fn binding(input: &str) -> IResult<&str, (String, String)> {
    let name = delimited(multispace0, identifier, multispace0);
    let value = map(take_till1(|c: char| c == ';'), |s: &str| s.trim().to_string());
    separated_pair(name, char('='), value).parse(input)
}

/// Parses `"x=pi;y=2.34"` into a name -> expression table. Names are lower-cased, a
/// trailing `;` and surrounding whitespace are allowed, the empty string gives no bindings.
pub fn parse_bindings(input: &str) -> Result<HashMap<String, String>, SyntaxError> {
    if input.trim().is_empty() {
        return Ok(HashMap::new());
    }
    let mut parser = all_consuming(terminated(
        separated_list1(char(';'), binding),
        pair(opt(char(';')), multispace0),
    ));
    let (_, pairs) = parser
        .parse(input)
        .map_err(|_| SyntaxError::MalformedBinding(input.to_string()))?;
    let mut table = HashMap::new();
    for (name, value) in pairs {
        if value.is_empty() {
            return Err(SyntaxError::MalformedBinding(input.to_string()));
        }
        table.insert(name.to_lowercase(), value);
    }
    Ok(table)
}

/// Splits `"x;y"` into its names. Each name is only trimmed here; whether it is a legal
/// variable is for the caller to decide.
pub fn parse_variable_list(input: &str) -> Result<Vec<String>, SyntaxError> {
    let item = map(take_till1(|c: char| c == ';'), |s: &str| s.trim().to_string());
    let mut parser = all_consuming(terminated(separated_list1(char(';'), item), opt(char(';'))));
    let (_, names) = parser
        .parse(input)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| SyntaxError::InvalidVariable(input.to_string()))?;
    if let Some(empty) = names.iter().find(|n| n.is_empty()) {
        return Err(SyntaxError::InvalidVariable(empty.clone()));
    }
    Ok(names)
}
