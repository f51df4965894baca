//! Parses the exported XML into [`Record`]s.
//!
//! Only the five predefined entities are decoded. Numeric character references are
//! left in place, the compiler decodes them where a body needs it.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::record::{Record, CHILDREN};

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid xml at byte {position}: {message}")]
    Xml { position: u64, message: String },
    #[error("unexpected closing tag at byte {0}")]
    UnexpectedEnd(u64),
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("document has no root element")]
    NoRoot,
    #[error("document has more than one root element")]
    MultipleRoots,
}

pub fn parse_record(xml: &str) -> Result<Record, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Record> = Vec::new();
    let mut root = None;

    loop {
        let event = reader.read_event().map_err(|err| ParseError::Xml {
            position: reader.buffer_position() as u64,
            message: err.to_string(),
        })?;

        match event {
            Event::Start(start) => {
                stack.push(open_record(&start, reader.buffer_position() as u64)?);
            }
            Event::Empty(start) => {
                let record = open_record(&start, reader.buffer_position() as u64)?;
                close_record(record, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let record = stack
                    .pop()
                    .ok_or(ParseError::UnexpectedEnd(reader.buffer_position() as u64))?;
                close_record(record, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(&text);
                    append_text(current, &decode_entities(&raw));
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    append_text(current, &String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = stack.pop() {
        return Err(ParseError::Unclosed(unclosed.tag));
    }

    root.ok_or(ParseError::NoRoot)
}

fn open_record(start: &BytesStart, position: u64) -> Result<Record, ParseError> {
    let mut record = Record::new(String::from_utf8_lossy(start.local_name().as_ref()));

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| ParseError::Xml {
            position,
            message: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = String::from_utf8_lossy(&attribute.value);
        record
            .attributes
            .insert(key, decode_entities(&value).into_owned());
    }

    Ok(record)
}

fn close_record(
    mut record: Record,
    stack: &mut [Record],
    root: &mut Option<Record>,
) -> Result<(), ParseError> {
    let parent = match stack.last_mut() {
        Some(parent) => parent,
        None => {
            if root.is_some() {
                return Err(ParseError::MultipleRoots);
            }
            *root = Some(record);
            return Ok(());
        }
    };

    if record.tag == CHILDREN {
        // `<children>` is a transparent container, its elements belong to the parent
        if let Some(children) = record.take(CHILDREN) {
            for child in children.into_vec() {
                parent.insert(CHILDREN, child);
            }
        }
    } else if parent.tag == CHILDREN {
        parent.insert(CHILDREN, record);
    } else {
        let key = record.tag.clone();
        parent.insert(&key, record);
    }

    Ok(())
}

fn append_text(record: &mut Record, text: &str) {
    match &mut record.text {
        Some(existing) => existing.push_str(text),
        None => record.text = Some(text.to_string()),
    }
}

/// Named entities only. `quick_xml::escape::unescape` would also decode `&#x..;`
/// references, which query bodies keep until extraction.
fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    Cow::Owned(
        raw.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&"),
    )
}
