//! Builds a full in-memory element tree from an XML document.

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use skperf_core::{FixtureSet, Mapper, Workload};
use tracing::debug;

pub const FIXTURE: &str = "test_data";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated character data directly inside this element.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Number of elements in this subtree, including `self`.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(element) = pending.pop() {
            count += 1;
            pending.extend(element.children.iter());
        }
        count
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

fn open_element(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ..Element::default()
    };
    for attr in start.attributes() {
        let attr = attr.with_context(|| format!("bad attribute on <{}>", element.name))?;
        element.attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            String::from_utf8_lossy(&attr.value).into_owned(),
        ));
    }
    Ok(element)
}

fn close_element(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => bail!("second root element <{}>", element.name),
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], raw: &[u8]) -> Result<()> {
    let text = String::from_utf8_lossy(raw);
    match stack.last_mut() {
        Some(current) => current.text.push_str(&text),
        None if text.trim().is_empty() => {}
        None => bail!("text outside the root element: {:?}", text.trim()),
    }
    Ok(())
}

/// Parse `data` into its root element. Malformed documents (mismatched or
/// unclosed tags, several roots, no root) are errors.
pub fn parse_document(data: &[u8]) -> Result<Element> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| anyhow!("XML error at byte {}: {}", reader.buffer_position(), e))?;
        match event {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::End(end) => {
                let element = stack.pop().ok_or_else(|| {
                    anyhow!("unexpected closing tag </{}>", String::from_utf8_lossy(end.name().as_ref()))
                })?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => push_text(&mut stack, &text)?,
            Event::CData(data) => push_text(&mut stack, &data)?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        bail!("unclosed element <{}>", open.name);
    }
    root.ok_or_else(|| anyhow!("document has no root element"))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct XmlParse;

impl Workload for XmlParse {
    fn run(&self, _degree: usize, _map: &Mapper, fixtures: &FixtureSet) -> Result<()> {
        let root = parse_document(fixtures.bytes(FIXTURE)?)?;
        debug!(root = %root.name, elements = root.element_count(), "xml document parsed");
        Ok(())
    }
}
