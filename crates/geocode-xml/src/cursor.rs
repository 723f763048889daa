//! Element-level cursor over a `quick-xml` event stream.
//!
//! The parser only ever asks three questions of the stream: "what is the
//! next child of the element I am in", "what text does this leaf hold", and
//! "skip this element". The cursor answers them and turns every stream
//! failure into a [`GeocodeParseError`] carrying the byte position.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::GeocodeParseError;
use crate::state::ParseState;

/// A start tag with its local name and decoded attributes.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) name: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    pub(crate) fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub(crate) struct ElementCursor<'a> {
    reader: Reader<&'a [u8]>,
    state: ParseState,
}

impl<'a> ElementCursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        let mut reader = Reader::from_reader(data);
        let config = reader.config_mut();
        config.trim_text(true);
        config.expand_empty_elements = true;
        config.check_end_names = true;
        Self {
            reader,
            state: ParseState::Init,
        }
    }

    pub(crate) fn state(&self) -> ParseState {
        self.state
    }

    /// Switch state, returning the previous one so the caller can restore it
    /// when the element closes.
    pub(crate) fn enter(&mut self, state: ParseState) -> ParseState {
        tracing::trace!(from = %self.state, to = %state, "parse state transition");
        std::mem::replace(&mut self.state, state)
    }

    pub(crate) fn leave(&mut self, previous: ParseState) {
        tracing::trace!(from = %self.state, to = %previous, "parse state transition");
        self.state = previous;
    }

    pub(crate) fn structure_error(&self, message: impl Into<String>) -> GeocodeParseError {
        GeocodeParseError::Structure {
            state: self.state,
            position: self.offset(),
            message: message.into(),
        }
    }

    fn xml_error(&self, source: quick_xml::Error) -> GeocodeParseError {
        GeocodeParseError::Xml {
            position: u64::try_from(self.reader.error_position()).unwrap_or(u64::MAX),
            source,
        }
    }

    fn eof_error(&self) -> GeocodeParseError {
        GeocodeParseError::UnexpectedEof {
            state: self.state,
            position: self.offset(),
        }
    }

    fn offset(&self) -> u64 {
        u64::try_from(self.reader.buffer_position()).unwrap_or(u64::MAX)
    }

    fn next_event(&mut self) -> Result<Event<'a>, GeocodeParseError> {
        self.reader.read_event().map_err(|e| self.xml_error(e))
    }

    /// Advance to the first element of the document.
    ///
    /// Returns `None` when the document holds no element at all.
    pub(crate) fn next_root(&mut self) -> Result<Option<Element>, GeocodeParseError> {
        loop {
            match self.next_event()? {
                Event::Start(start) => return self.element(&start).map(Some),
                Event::Eof => return Ok(None),
                Event::Text(_) | Event::CData(_) => {
                    return Err(self.structure_error("character data found outside the root element"));
                }
                _ => {}
            }
        }
    }

    /// Next child element of the currently open element, or `None` once
    /// that element's end tag has been consumed.
    ///
    /// Character data between child elements is decoded and dropped.
    pub(crate) fn next_child(&mut self) -> Result<Option<Element>, GeocodeParseError> {
        loop {
            match self.next_event()? {
                Event::Start(start) => return self.element(&start).map(Some),
                Event::End(_) => return Ok(None),
                Event::Eof => return Err(self.eof_error()),
                event => self.check_character_data(&event)?,
            }
        }
    }

    /// Character content of a leaf element, consuming its end tag.
    pub(crate) fn read_text(&mut self, element: &str) -> Result<String, GeocodeParseError> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                Event::Text(t) => {
                    let unescaped = t.unescape().map_err(|e| self.xml_error(e.into()))?;
                    text.push_str(&unescaped);
                }
                Event::CData(c) => {
                    let raw = std::str::from_utf8(c.as_ref()).map_err(|_| {
                        self.structure_error(format!(
                            "the element \"{element}\" holds CDATA that is not valid UTF-8"
                        ))
                    })?;
                    text.push_str(raw);
                }
                Event::Start(start) => {
                    let child = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                    return Err(self.structure_error(format!(
                        "the element \"{element}\" was expected to hold character data \
                         (found a child element named \"{child}\")"
                    )));
                }
                Event::End(_) => return Ok(text.trim().to_string()),
                Event::Eof => return Err(self.eof_error()),
                _ => {}
            }
        }
    }

    /// Skip the rest of the currently open element, nested content included.
    pub(crate) fn skip_element(&mut self) -> Result<(), GeocodeParseError> {
        let mut depth = 1usize;
        loop {
            match self.next_event()? {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Event::Eof => return Err(self.eof_error()),
                event => self.check_character_data(&event)?,
            }
        }
    }

    /// Consume everything after the root element; only comments,
    /// processing instructions and whitespace may follow it.
    pub(crate) fn finish(&mut self) -> Result<(), GeocodeParseError> {
        loop {
            match self.next_event()? {
                Event::Eof => return Ok(()),
                Event::Start(start) => {
                    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                    return Err(self.structure_error(format!(
                        "a single root element named \"places\" was expected \
                         (second root element was named \"{name}\")"
                    )));
                }
                Event::Text(_) | Event::CData(_) => {
                    return Err(self.structure_error("character data found after the root element"));
                }
                _ => {}
            }
        }
    }

    /// Decode character data the parser has no use for, so that encoding
    /// and entity errors fail the parse wherever they sit.
    fn check_character_data(&self, event: &Event<'_>) -> Result<(), GeocodeParseError> {
        match event {
            Event::Text(t) => {
                t.unescape().map_err(|e| self.xml_error(e.into()))?;
            }
            Event::CData(c) => {
                std::str::from_utf8(c.as_ref())
                    .map_err(|_| self.structure_error("CDATA section is not valid UTF-8"))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn element(&self, start: &BytesStart<'_>) -> Result<Element, GeocodeParseError> {
        let name = std::str::from_utf8(start.local_name().as_ref())
            .map_err(|_| self.structure_error("element name is not valid UTF-8"))?
            .to_string();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.xml_error(e.into()))?;
            let key = std::str::from_utf8(attr.key.local_name().as_ref())
                .map_err(|_| self.structure_error("attribute name is not valid UTF-8"))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| self.xml_error(e.into()))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Element { name, attributes })
    }
}
