//! Owned XML element trees.
//!
//! An [`Element`] is the parsed form of one stanza: a name, ordered
//! attributes and a list of child nodes. Namespaces are kept as plain
//! `xmlns` attributes; [`Element::ns`] reads the element's own declaration.

mod parse;
mod serialize;

use std::str::FromStr;

use crate::error::StanzaError;

/// A child node of an element.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Character data, already unescaped.
    Text(String),
}

/// An XML element.
///
/// # Example
///
/// ```
/// use xmpp_stanza::Element;
///
/// let msg = Element::builder("message")
///     .attr("to", "lloyd@localhost/laptop")
///     .attr("type", "chat")
///     .append(Element::builder("body").text("pong"))
///     .build();
///
/// assert_eq!(msg.get_child_text("body").as_deref(), Some("pong"));
/// assert_eq!(
///     msg.to_string(),
///     r#"<message to="lloyd@localhost/laptop" type="chat"><body>pong</body></message>"#
/// );
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Start building an element.
    pub fn builder(name: impl Into<String>) -> ElementBuilder {
        ElementBuilder {
            element: Element::new(name),
        }
    }

    /// Parse a single element from a string.
    pub fn parse(input: &str) -> crate::Result<Self> {
        parse::parse_element(input)
    }

    /// The element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the element has the given name.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// The element's own `xmlns` declaration.
    pub fn ns(&self) -> Option<&str> {
        self.attr("xmlns")
    }

    /// Look up an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate attributes in document order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k == key)?;
        Some(self.attrs.remove(pos).1)
    }

    /// All child nodes, text included.
    pub fn nodes(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping text.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given name.
    pub fn get_child(&self, name: &str) -> Option<&Element> {
        self.children().find(|el| el.is(name))
    }

    /// First child element with the given name and namespace.
    pub fn get_child_ns(&self, name: &str, ns: &str) -> Option<&Element> {
        self.children().find(|el| el.is(name) && el.ns() == Some(ns))
    }

    /// Whether any child element declares the given namespace.
    pub fn has_child_in_ns(&self, ns: &str) -> bool {
        self.children().any(|el| el.ns() == Some(ns))
    }

    /// Text content of the first child with the given name.
    pub fn get_child_text(&self, name: &str) -> Option<String> {
        self.get_child(name).map(Element::text)
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Append a child element.
    pub fn append_child(&mut self, child: Element) -> &mut Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Append character data.
    pub fn append_text(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
        self
    }
}

impl FromStr for Element {
    type Err = StanzaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::parse(s)
    }
}

/// Builder for [`Element`].
#[derive(Debug)]
#[must_use = "builders do nothing until `build` is called"]
pub struct ElementBuilder {
    element: Element,
}

impl ElementBuilder {
    /// Set an attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.element.set_attr(key, value.to_string());
        self
    }

    /// Set an attribute only when a value is present.
    pub fn attr_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    /// Declare the element's namespace.
    pub fn ns(self, ns: &str) -> Self {
        self.attr("xmlns", ns)
    }

    /// Append a child element (or builder).
    pub fn append(mut self, child: impl Into<Element>) -> Self {
        self.element.append_child(child.into());
        self
    }

    /// Append character data.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.element.append_text(text);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Element {
        self.element
    }
}

impl From<ElementBuilder> for Element {
    fn from(builder: ElementBuilder) -> Self {
        builder.build()
    }
}
