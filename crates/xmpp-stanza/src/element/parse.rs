//! Nom-based single-element XML parser.
//!
//! Handles what appears inside one stanza: elements, attributes in single or
//! double quotes, character data, the five predefined entities, numeric
//! character references, CDATA sections and comments. An optional XML
//! declaration may precede the root. DTDs and processing instructions inside
//! the element are not supported.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map_opt, opt},
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use super::Element;
use crate::error::{Result, StanzaError};

/// Elements nested deeper than this are rejected.
const MAX_DEPTH: usize = 64;

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn parse_name(input: &str) -> IResult<&str, &str> {
    take_while1(is_name_char)(input)
}

/// Decode entity and character references.
///
/// Returns `None` for an unknown or unterminated reference.
pub(crate) fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after.find(';')?;
        let entity = &after[..semi];
        let decoded = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()?
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()?
                } else {
                    return None;
                };
                char::from_u32(code)?
            }
        };
        out.push(decoded);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Some(out)
}

fn parse_attr_value(input: &str) -> IResult<&str, String> {
    map_opt(
        alt((
            delimited(char('"'), take_while(|c: char| c != '"' && c != '<'), char('"')),
            delimited(char('\''), take_while(|c: char| c != '\'' && c != '<'), char('\'')),
        )),
        unescape,
    )(input)
}

fn parse_attribute(input: &str) -> IResult<&str, (String, String)> {
    let (input, _) = multispace1(input)?;
    let (input, key) = parse_name(input)?;
    let (input, _) = tuple((multispace0, char('='), multispace0))(input)?;
    let (input, value) = parse_attr_value(input)?;
    Ok((input, (key.to_owned(), value)))
}

fn parse_text(input: &str) -> IResult<&str, String> {
    map_opt(take_while1(|c: char| c != '<'), unescape)(input)
}

fn parse_cdata(input: &str) -> IResult<&str, &str> {
    delimited(tag("<![CDATA["), take_until("]]>"), tag("]]>"))(input)
}

fn parse_comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->"))(input)
}

fn parse_declaration(input: &str) -> IResult<&str, &str> {
    delimited(tag("<?xml"), take_until("?>"), tag("?>"))(input)
}

/// Parse the opening tag; `true` means the element was self-closing.
fn parse_open_tag(input: &str) -> IResult<&str, (Element, bool)> {
    let (mut input, name) = preceded(char('<'), parse_name)(input)?;
    let mut element = Element::new(name);
    while let Ok((rest, (key, value))) = parse_attribute(input) {
        element.attrs.push((key, value));
        input = rest;
    }
    let (input, _) = multispace0(input)?;
    let (input, close) = alt((tag("/>"), tag(">")))(input)?;
    Ok((input, (element, close == "/>")))
}

fn parse_close_tag(input: &str) -> IResult<&str, &str> {
    delimited(tag("</"), parse_name, terminated(multispace0, char('>')))(input)
}

/// Recursive element parser carrying the original input for error offsets.
struct Parser<'a> {
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn error(&self, at: &str, context: &str) -> StanzaError {
        StanzaError::Malformed {
            position: self.source.len() - at.len(),
            context: context.to_owned(),
        }
    }

    fn element(&self, input: &'a str, depth: usize) -> Result<(&'a str, Element)> {
        if depth > MAX_DEPTH {
            return Err(self.error(input, "element nesting too deep"));
        }

        let (mut input, (mut element, self_closing)) =
            parse_open_tag(input).map_err(|_| self.error(input, "opening tag"))?;
        if self_closing {
            return Ok((input, element));
        }

        loop {
            if input.is_empty() {
                return Err(self.error(input, "closing tag"));
            }
            if input.starts_with("</") {
                let (rest, found) =
                    parse_close_tag(input).map_err(|_| self.error(input, "closing tag"))?;
                if found != element.name {
                    return Err(StanzaError::MismatchedTag {
                        expected: element.name,
                        found: found.to_owned(),
                    });
                }
                return Ok((rest, element));
            }
            if input.starts_with("<!--") {
                let (rest, _) = parse_comment(input).map_err(|_| self.error(input, "comment"))?;
                input = rest;
                continue;
            }
            if input.starts_with("<![CDATA[") {
                let (rest, data) = parse_cdata(input).map_err(|_| self.error(input, "cdata"))?;
                element.append_text(data);
                input = rest;
                continue;
            }
            if input.starts_with('<') {
                let (rest, child) = self.element(input, depth + 1)?;
                element.append_child(child);
                input = rest;
                continue;
            }
            let (rest, text) = parse_text(input).map_err(|_| self.error(input, "character data"))?;
            element.append_text(text);
            input = rest;
        }
    }
}

/// Parse exactly one element, optionally preceded by an XML declaration.
pub(crate) fn parse_element(source: &str) -> Result<Element> {
    let parser = Parser { source };

    let (input, _) = multispace0::<_, nom::error::Error<&str>>(source)
        .map_err(|_| parser.error(source, "leading whitespace"))?;
    if input.is_empty() {
        return Err(StanzaError::Empty);
    }
    let (input, _) = opt(terminated(parse_declaration, multispace0))(input)
        .map_err(|_| parser.error(input, "xml declaration"))?;

    let (rest, element) = parser.element(input, 0)?;

    let trailing = rest.trim_start();
    if !trailing.is_empty() {
        return Err(StanzaError::TrailingData(source.len() - trailing.len()));
    }
    Ok(element)
}
