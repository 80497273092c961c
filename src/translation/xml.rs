// XML payload readers for service answers
// Author: kelexine (https://github.com/kelexine)

use crate::error::{Result, TranslatorError};
use quick_xml::events::Event;
use quick_xml::Reader;

fn decode_error(e: impl std::fmt::Display) -> TranslatorError {
    TranslatorError::Decode(format!("XML parsing error: {}", e))
}

fn cdata_text(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(decode_error)
}

/// Text content directly inside the root element, entities and CDATA
/// decoded.
pub fn root_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut text = String::new();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Start(_) => {
                depth += 1;
                seen_root = true;
            }
            Event::Empty(_) if depth == 0 => {
                seen_root = true;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Text(e) if depth == 1 => {
                text.push_str(&e.unescape().map_err(decode_error)?);
            }
            Event::CData(e) if depth == 1 => {
                text.push_str(cdata_text(&e)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root || depth != 0 {
        return Err(TranslatorError::Decode(
            "XML parsing error: unexpected end of document".to_string(),
        ));
    }

    Ok(text)
}

/// Text of every `item` child of the root element, in document order.
///
/// With a `field`, the text of that child of each item is taken instead.
/// Empty or nil items, and items lacking `field`, yield `""`.
pub fn collect_items(xml: &str, item: &str, field: Option<&str>) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let item = item.as_bytes();
    let field = field.map(str::as_bytes);
    let capture_depth = if field.is_some() { 3 } else { 2 };

    let mut items = Vec::new();
    let mut current: Option<String> = None;
    let mut capturing = false;
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Start(e) => {
                depth += 1;
                seen_root = true;
                let name = e.local_name();
                if depth == 2 && name.as_ref() == item {
                    current = Some(String::new());
                    capturing = field.is_none();
                } else if depth == 3 && current.is_some() && Some(name.as_ref()) == field {
                    capturing = true;
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    seen_root = true;
                } else if depth == 1 && e.local_name().as_ref() == item {
                    items.push(String::new());
                }
            }
            Event::End(_) => {
                if depth == capture_depth {
                    capturing = false;
                }
                if depth == 2 {
                    if let Some(value) = current.take() {
                        items.push(value);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(e) if capturing => {
                if let Some(value) = current.as_mut() {
                    value.push_str(&e.unescape().map_err(decode_error)?);
                }
            }
            Event::CData(e) if capturing => {
                if let Some(value) = current.as_mut() {
                    value.push_str(cdata_text(&e)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root || depth != 0 {
        return Err(TranslatorError::Decode(
            "XML parsing error: unexpected end of document".to_string(),
        ));
    }

    Ok(items)
}
