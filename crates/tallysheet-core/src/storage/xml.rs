//! XML snapshot encoding.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <spreadsheet version="ps6">
//!   <cell>
//!     <name>A1</name>
//!     <contents>=B1+2</contents>
//!   </cell>
//! </spreadsheet>
//! ```

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Record, Snapshot};
use crate::error::PersistenceError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Contents,
}

/// Decode an XML snapshot.
pub fn parse_xml(content: &str) -> Result<Snapshot, PersistenceError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(false);

    let mut version: Option<String> = None;
    let mut records = Vec::new();

    let mut in_cell = false;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    let mut name: Option<String> = None;
    let mut contents: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"spreadsheet" => version = version_attr(&e)?,
                b"cell" => {
                    in_cell = true;
                    name = None;
                    contents = None;
                }
                b"name" if in_cell => {
                    field = Some(Field::Name);
                    text.clear();
                }
                b"contents" if in_cell => {
                    field = Some(Field::Contents);
                    text.clear();
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"spreadsheet" => version = version_attr(&e)?,
                b"name" if in_cell => name = Some(String::new()),
                b"contents" if in_cell => contents = Some(String::new()),
                b"cell" => return Err(incomplete_cell(content, reader.buffer_position())),
                _ => {}
            },
            Event::Text(e) if field.is_some() => text.push_str(&e.unescape()?),
            Event::CData(e) if field.is_some() => {
                let raw = e.into_inner();
                let decoded = std::str::from_utf8(&raw).map_err(|err| PersistenceError::Parse {
                    line: line_at(content, reader.buffer_position()),
                    message: format!("CDATA is not UTF-8: {}", err),
                })?;
                text.push_str(decoded);
            }
            Event::End(e) => match e.name().as_ref() {
                b"name" if field == Some(Field::Name) => {
                    field = None;
                    name = Some(std::mem::take(&mut text));
                }
                b"contents" if field == Some(Field::Contents) => {
                    field = None;
                    contents = Some(std::mem::take(&mut text));
                }
                b"cell" if in_cell => {
                    in_cell = false;
                    let (Some(name), Some(contents)) = (name.take(), contents.take()) else {
                        return Err(incomplete_cell(content, reader.buffer_position()));
                    };
                    records.push(Record::new(name.trim(), contents));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let version = version.ok_or(PersistenceError::MissingVersion)?;
    Ok(Snapshot { version, records })
}

/// Read only the `version` attribute of the root element.
pub fn parse_xml_version(content: &str) -> Result<String, PersistenceError> {
    let mut reader = Reader::from_str(content);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"spreadsheet" => {
                return version_attr(&e)?.ok_or(PersistenceError::MissingVersion);
            }
            Event::Eof => return Err(PersistenceError::MissingVersion),
            _ => {}
        }
    }
}

fn version_attr(e: &BytesStart<'_>) -> Result<Option<String>, PersistenceError> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == b"version" {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn incomplete_cell(content: &str, position: usize) -> PersistenceError {
    PersistenceError::Parse {
        line: line_at(content, position),
        message: "<cell> needs both <name> and <contents>".to_string(),
    }
}

fn line_at(content: &str, position: usize) -> usize {
    let end = position.min(content.len());
    content.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Encode a snapshot as XML.
pub fn write_xml_content(snapshot: &Snapshot) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str(&format!(
        "<spreadsheet version=\"{}\">\n",
        escape_xml(&snapshot.version)
    ));
    for record in &snapshot.records {
        out.push_str("  <cell>\n");
        out.push_str(&format!("    <name>{}</name>\n", escape_xml(&record.name)));
        out.push_str(&format!(
            "    <contents>{}</contents>\n",
            escape_xml(&record.contents)
        ));
        out.push_str("  </cell>\n");
    }
    out.push_str("</spreadsheet>\n");
    out
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
        .replace('\r', "&#13;")
}
