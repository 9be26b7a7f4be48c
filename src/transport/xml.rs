use std::str::Utf8Error;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::map::Entry;
use serde_json::{Map, Value};

use crate::domain::ProviderResponse;

const ATTRIBUTES_KEY: &str = "@attributes";
const TEXT_KEY: &str = "#text";

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid XML response: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML response is not valid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),

    #[error("XML response has no root element")]
    NoRoot,

    #[error("XML response has more than one root element")]
    MultipleRoots,

    #[error("XML response ends inside <{name}>")]
    Unclosed { name: String },
}

#[derive(Debug, Default)]
struct Frame {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, DecodeError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_owned();
        let mut attributes = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = std::str::from_utf8(attribute.key.as_ref())?.to_owned();
            let value = attribute
                .unescape_value()
                .map_err(quick_xml::Error::from)?
                .into_owned();
            attributes.insert(key, Value::String(value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn into_value(self) -> Value {
        let mut object = self.children;
        if !self.attributes.is_empty() {
            object.insert(ATTRIBUTES_KEY.to_owned(), Value::Object(self.attributes));
        }

        // Leaf text is kept byte for byte; whitespace between child elements is layout.
        if object.is_empty() {
            if self.text.is_empty() {
                return Value::Object(object);
            }
            return Value::String(self.text);
        }
        if !self.text.trim().is_empty() {
            object.insert(TEXT_KEY.to_owned(), Value::String(self.text));
        }
        Value::Object(object)
    }
}

/// Decode a Zenziva XML reply into a nested field mapping.
///
/// The root element is dropped. Child elements become keys, repeated siblings
/// collapse into an array, text-only elements become strings (whitespace
/// included), empty elements become empty objects, and attributes are gathered
/// under `@attributes`.
pub fn decode_xml_response(xml: &str) -> Result<ProviderResponse, DecodeError> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(DecodeError::MultipleRoots);
                }
                stack.push(Frame::open(&start)?);
            }
            Event::Empty(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(DecodeError::MultipleRoots);
                }
                let frame = Frame::open(&start)?;
                close(frame, &mut stack, &mut root);
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let text = text.unescape().map_err(quick_xml::Error::from)?;
                    frame.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(std::str::from_utf8(&data)?);
                }
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    close(frame, &mut stack, &mut root);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(frame) = stack.pop() {
        return Err(DecodeError::Unclosed { name: frame.name });
    }
    root.map(ProviderResponse::new).ok_or(DecodeError::NoRoot)
}

fn close(frame: Frame, stack: &mut [Frame], root: &mut Option<Value>) {
    let name = frame.name.clone();
    let value = frame.into_value();
    match stack.last_mut() {
        Some(parent) => insert_child(&mut parent.children, name, value),
        None => *root = Some(value),
    }
}

fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.entry(name) {
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            Value::Array(items) => items.push(value),
            existing => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_zenziva_reply() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <response>
          <message>
            <to>081234567890</to>
            <status>0</status>
            <text>Success</text>
            <balance>9500</balance>
          </message>
        </response>"#;

        let response = decode_xml_response(xml).unwrap();
        assert_eq!(
            response.as_value(),
            &json!({
                "message": {
                    "to": "081234567890",
                    "status": "0",
                    "text": "Success",
                    "balance": "9500"
                }
            })
        );
        assert!(response.is_success());
    }

    #[test]
    fn repeated_elements_become_arrays() {
        let xml = "<response><message><text>a</text></message><message><text>b</text></message></response>";
        let response = decode_xml_response(xml).unwrap();
        assert_eq!(
            response.as_value(),
            &json!({ "message": [ { "text": "a" }, { "text": "b" } ] })
        );
    }

    #[test]
    fn attributes_and_empty_elements() {
        let xml = r#"<response code="1"><message><text>Invalid Sender ID</text><balance/></message></response>"#;
        let response = decode_xml_response(xml).unwrap();
        assert_eq!(
            response.as_value(),
            &json!({
                "@attributes": { "code": "1" },
                "message": { "text": "Invalid Sender ID", "balance": {} }
            })
        );
    }

    #[test]
    fn unescapes_entities_and_cdata() {
        let xml = "<response><message><text>A &amp; B</text><to><![CDATA[<08>]]></to></message></response>";
        let response = decode_xml_response(xml).unwrap();
        assert_eq!(response.message_text(), Some("A & B"));
        assert_eq!(response.get("message.to"), Some(&json!("<08>")));
    }

    #[test]
    fn leaf_text_keeps_surrounding_whitespace() {
        let xml = "<response>\n  <message>\n    <text> Success </text>\n    <to>\t0812\n</to>\n  </message>\n</response>";
        let response = decode_xml_response(xml).unwrap();
        assert_eq!(
            response.as_value(),
            &json!({ "message": { "text": " Success ", "to": "\t0812\n" } })
        );
        assert!(!response.is_success());
    }

    #[test]
    fn into_value_hands_back_the_mapping() {
        let value = decode_xml_response("<response><message><text>Success</text></message></response>")
            .unwrap()
            .into_value();
        assert_eq!(value, json!({ "message": { "text": "Success" } }));
        assert_eq!(ProviderResponse::new(value.clone()).as_value(), &value);
    }

    #[test]
    fn rejects_non_xml_bodies() {
        assert!(matches!(
            decode_xml_response("Service Unavailable"),
            Err(DecodeError::NoRoot)
        ));
        assert!(matches!(decode_xml_response(""), Err(DecodeError::NoRoot)));
        assert!(decode_xml_response("<response><message>").is_err());
        assert!(matches!(
            decode_xml_response("<a></b>"),
            Err(DecodeError::Xml(_))
        ));
        assert!(matches!(
            decode_xml_response("<a/><b/>"),
            Err(DecodeError::MultipleRoots)
        ));
    }
}
