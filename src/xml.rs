use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::GxdbError;

/// Owned XML element. `text` is the character data that precedes the first
/// child element, `None` when there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Resolves a `/`-separated path of child tags, `*` matching any tag, and
    /// returns the first match in document order.
    pub fn find(&self, path: &str) -> Option<&Element> {
        let segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();
        if segments.is_empty() {
            return Some(self);
        }
        find_in(self, &segments)
    }

    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.matches(tag))
    }

    pub fn child_text(&self, path: &str) -> Option<String> {
        self.find(path).and_then(|element| element.text.clone())
    }

    fn matches(&self, tag: &str) -> bool {
        tag == "*" || self.name == tag
    }

    fn push_text(&mut self, chunk: &str) {
        if !self.children.is_empty() || chunk.is_empty() {
            return;
        }
        match &mut self.text {
            Some(text) => text.push_str(chunk),
            None => self.text = Some(chunk.to_string()),
        }
    }
}

fn find_in<'a>(element: &'a Element, segments: &[&str]) -> Option<&'a Element> {
    let (first, rest) = segments.split_first()?;
    element
        .children
        .iter()
        .filter(|child| child.matches(first))
        .find_map(|child| {
            if rest.is_empty() {
                Some(child)
            } else {
                find_in(child, rest)
            }
        })
}

#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn read(path: &Path) -> Result<Self, GxdbError> {
        let bytes = fs::read(path).map_err(|err| GxdbError::XmlRead {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Decodes raw document bytes using the byte order mark, else the
    /// encoding named in the XML declaration, else UTF-8, then parses them.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GxdbError> {
        let encoding = match Encoding::for_bom(bytes) {
            Some((encoding, _)) => encoding,
            None => declared_encoding(bytes)?.unwrap_or(UTF_8),
        };
        let (content, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            return Err(parse_error(
                0,
                &format!("document is not valid {}", encoding.name()),
            ));
        }
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, GxdbError> {
        let mut reader = Reader::from_str(content);
        reader.check_end_names(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .map_err(|err| parse_error(position, &err.to_string()))?;
            match event {
                Event::Start(start) => {
                    if root.is_some() {
                        return Err(parse_error(position, "junk after document element"));
                    }
                    stack.push(open_element(&start, position)?);
                }
                Event::Empty(start) => {
                    let element = open_element(&start, position)?;
                    close_element(&mut stack, &mut root, element, position)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| parse_error(position, "unexpected closing tag"))?;
                    close_element(&mut stack, &mut root, element, position)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|err| parse_error(position, &err.to_string()))?;
                    match stack.last_mut() {
                        Some(current) => current.push_text(&text),
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(parse_error(position, "text outside of document element"));
                        }
                    }
                }
                Event::CData(data) => {
                    let text = std::str::from_utf8(&data)
                        .map_err(|err| parse_error(position, &err.to_string()))?;
                    match stack.last_mut() {
                        Some(current) => current.push_text(text),
                        None => {
                            return Err(parse_error(position, "CDATA outside of document element"));
                        }
                    }
                }
                Event::Eof => break,
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(parse_error(
                reader.buffer_position(),
                &format!("unclosed element <{}>", open.name),
            ));
        }
        let root = root.ok_or_else(|| parse_error(0, "no element found"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }
}

/// The encoding label of a leading `<?xml ... encoding="..."?>`, if any.
/// Anything other than a declaration is left for the real parse to judge.
fn declared_encoding(bytes: &[u8]) -> Result<Option<&'static Encoding>, GxdbError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let Ok(Event::Decl(decl)) = reader.read_event_into(&mut buf) else {
        return Ok(None);
    };
    let Some(label) = decl.encoding() else {
        return Ok(None);
    };
    let label = label.map_err(|err| parse_error(0, &err.to_string()))?;
    Encoding::for_label(&label).map(Some).ok_or_else(|| {
        parse_error(
            0,
            &format!("unknown encoding {}", String::from_utf8_lossy(&label)),
        )
    })
}

fn open_element(start: &BytesStart<'_>, position: usize) -> Result<Element, GxdbError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|err| parse_error(position, &err.to_string()))?
        .to_string();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| parse_error(position, &err.to_string()))?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|err| parse_error(position, &err.to_string()))?
            .to_string();
        let value = attribute
            .unescape_value()
            .map_err(|err| parse_error(position, &err.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn close_element(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: usize,
) -> Result<(), GxdbError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(parse_error(position, "junk after document element")),
    }
    Ok(())
}

fn parse_error(position: usize, message: &str) -> GxdbError {
    GxdbError::XmlParse(format!("malformed XML at byte {position}: {message}"))
}
