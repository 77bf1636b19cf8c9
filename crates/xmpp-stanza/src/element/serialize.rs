//! Element serialization.
//!
//! Line breaks are written as character references so that a serialized
//! stanza always fits on a single line.

use std::fmt::{self, Write};

use super::{Element, Node};

pub(crate) fn escape_text(f: &mut impl Write, text: &str) -> fmt::Result {
    for c in text.chars() {
        match c {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            '\n' => f.write_str("&#10;")?,
            '\r' => f.write_str("&#13;")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

pub(crate) fn escape_attr(f: &mut impl Write, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            '"' => f.write_str("&quot;")?,
            '\'' => f.write_str("&apos;")?,
            '\t' => f.write_str("&#9;")?,
            c => escape_text(f, c.encode_utf8(&mut [0; 4]))?,
        }
    }
    Ok(())
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attrs {
            write!(f, " {}=\"", key)?;
            escape_attr(f, value)?;
            f.write_char('"')?;
        }

        if self.children.is_empty() {
            return f.write_str("/>");
        }

        f.write_char('>')?;
        for node in &self.children {
            match node {
                Node::Element(child) => fmt::Display::fmt(child, f)?,
                Node::Text(text) => escape_text(f, text)?,
            }
        }
        write!(f, "</{}>", self.name)
    }
}
