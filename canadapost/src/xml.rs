//! A small element tree for reading responses.
//!
//! Lookups never fail: a missing element reads as empty text, repeated elements read as the
//! first one, and child elements nested inside a text field are ignored. Only a body that
//! is not a well-formed document is an error.

use quick_xml::{
    escape::resolve_predefined_entity,
    events::{BytesStart, Event},
    Reader,
};
use serde_json::{Map, Value};

use crate::XmlError;

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Text directly inside this element, untrimmed.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Read a whole document and return its root element.
    pub fn parse(xml: &str) -> Result<Element, XmlError> {
        let mut reader = Reader::from_str(xml);
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => open.push(Element::open(&e)?),
                Event::Empty(e) => close(&mut open, &mut root, Element::open(&e)?)?,
                Event::End(_) => {
                    if let Some(element) = open.pop() {
                        close(&mut open, &mut root, element)?;
                    }
                }
                Event::Text(e) => {
                    if let Some(current) = open.last_mut() {
                        current.text.push_str(&e.decode().map_err(quick_xml::Error::from)?);
                    }
                }
                Event::CData(e) => {
                    if let Some(current) = open.last_mut() {
                        current.text.push_str(&e.decode().map_err(quick_xml::Error::from)?);
                    }
                }
                Event::GeneralRef(e) => {
                    if let Some(current) = open.last_mut() {
                        if let Some(ch) = e.resolve_char_ref()? {
                            current.text.push(ch);
                        } else {
                            let name = e.decode().map_err(quick_xml::Error::from)?;
                            match resolve_predefined_entity(&name) {
                                Some(s) => current.text.push_str(s),
                                None => log::debug!("ignoring unknown entity &{};", name),
                            }
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(XmlError::Unclosed(unclosed.name.to_string()));
        }
        root.ok_or(XmlError::MissingRoot)
    }

    fn open(start: &BytesStart) -> Result<Element, XmlError> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                attr.unescape_value()?.into_owned(),
            ));
        }

        Ok(Element {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            ..Default::default()
        })
    }

    /// The first child called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Every child called `name`, in document order.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a `/` separated path of child names, taking the first match at each step.
    pub fn find(&self, path: &str) -> Option<&Element> {
        path.split('/').try_fold(self, |element, name| element.child(name))
    }

    /// The trimmed text at `path`, or an empty string.
    pub fn text_of(&self, path: &str) -> &str {
        self.find(path).map(|e| e.text.trim()).unwrap_or_default()
    }

    pub fn attribute(&self, name: &str) -> &str {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
            .unwrap_or_default()
    }

    /// The children and attributes of this element as JSON. Leaves become strings,
    /// attributes are keyed `@name` and repeated children become arrays.
    pub fn to_json(&self) -> Value {
        if self.children.is_empty() && self.attributes.is_empty() {
            return Value::String(self.text.trim().to_string());
        }

        let mut map = Map::new();
        for (key, value) in &self.attributes {
            map.insert(format!("@{}", key), Value::String(value.to_string()));
        }
        for child in &self.children {
            let value = child.to_json();
            match map.get_mut(&child.name) {
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(child.name.to_string(), value);
                }
            }
        }
        let text = self.text.trim();
        if !text.is_empty() {
            map.insert("$text".to_string(), Value::String(text.to_string()));
        }

        Value::Object(map)
    }
}

fn close(open: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), XmlError> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::UnexpectedElement(element.name));
    }
    *root = Some(element);
    Ok(())
}
