//! Minimal element tree and its HTML serialization.
//!
//! The renderer builds a tree of [`Node`]s; [`to_html`] writes it out with
//! `quick_xml`, which takes care of text and attribute escaping.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

const VOID_ELEMENTS: [&str; 6] = ["img", "input", "meta", "link", "br", "hr"];
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Escaped on output, except inside `script`/`style` where the
    /// producer is responsible for making it safe.
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn class(self, value: &str) -> Self {
        self.attr("class", value)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.child(Node::Text(value.into()))
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(existing) => existing.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .map_or(false, |c| c.split_whitespace().any(|c| c == class))
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Depth-first search, including `self`.
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if pred(self) {
            out.push(self);
        }
        for child in self.elements() {
            child.find_all(pred, out);
        }
    }

    pub fn by_class(&self, class: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.find_all(&|e| e.has_class(class), &mut out);
        out
    }

    pub fn by_tag(&self, tag: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.find_all(&|e| e.tag == tag, &mut out);
        out
    }

    pub fn by_id(&self, id: &str) -> Option<&Element> {
        let mut out = Vec::new();
        self.find_all(&|e| e.get_attr("id") == Some(id), &mut out);
        out.into_iter().next()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => out.push_str(&e.text_content()),
            }
        }
        out
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

pub fn to_html(root: &Element) -> anyhow::Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::DocType(BytesText::from_escaped("html")))?;
    write_element(&mut writer, root)?;
    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

/// Serializes a fragment without the doctype.
pub fn fragment_to_html(node: &Element) -> anyhow::Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_element(&mut writer, node)?;
    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, element: &Element) -> anyhow::Result<()> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (name, value) in &element.attrs {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    let raw = RAW_TEXT_ELEMENTS.contains(&element.tag.as_str());
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) if raw => writer.write_event(Event::Text(BytesText::from_escaped(t.as_str())))?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
    Ok(())
}
