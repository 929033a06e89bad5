//! Turns raw API bodies into attribute nodes.
//!
//! JSON and XML are both first decoded into one `serde_json::Value` tree using
//! the `@attributes` convention: an element's own attributes sit under the
//! `@attributes` key, child elements are keyed by tag (an array when the tag
//! repeats, a bare object when it occurs once) and non-blank text sits under
//! `#text`. Entity lookup and flattening then run on that tree regardless of
//! the wire format.

use crate::domain::model::{AttributeNode, ContentKind, Parsed, RawPayload, RecordList};
use crate::utils::error::ParseError;
use quick_xml::encoding::Decoder;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

pub const ATTRIBUTES_KEY: &str = "@attributes";
pub const TEXT_KEY: &str = "#text";
/// Field that carries the body of a plain-text response.
pub const PLAIN_TEXT_FIELD: &str = "text";

/// Parse `raw` and return the entity found at `path`.
///
/// Fails with [`ParseError::UnexpectedShape`] when the path is missing.
pub fn parse(raw: &RawPayload, path: &[&str]) -> Result<Parsed, ParseError> {
    match parse_lenient(raw, path)? {
        Some(parsed) => Ok(parsed),
        None => Err(unexpected_shape(path)),
    }
}

/// Like [`parse`], but a missing or null final path segment under an existing
/// parent yields `Ok(None)`; the API drops empty collections that way.
pub fn parse_lenient(raw: &RawPayload, path: &[&str]) -> Result<Option<Parsed>, ParseError> {
    if raw.kind == ContentKind::PlainText {
        tracing::debug!("Plain-text payload ({} bytes) wrapped as a single record", raw.body.len());
        let node = AttributeNode::new().with(PLAIN_TEXT_FIELD, raw.body.clone());
        return Ok(Some(Parsed::List(RecordList::singleton(node))));
    }

    let tree = to_tree(raw)?;

    let Some((leaf, parents)) = path.split_last() else {
        return entity_at(&tree, path).map(Some);
    };

    let parent = lookup(&tree, parents)
        .filter(|v| v.is_object())
        .ok_or_else(|| unexpected_shape(path))?;

    match parent.get(*leaf) {
        None | Some(Value::Null) => {
            tracing::debug!("No entity at '{}'", path.join("."));
            Ok(None)
        }
        Some(value) => entity_at(value, path).map(Some),
    }
}

/// Decode a JSON or XML body into the uniform tree.
pub fn to_tree(raw: &RawPayload) -> Result<Value, ParseError> {
    match raw.kind {
        ContentKind::Json => serde_json::from_str(&raw.body).map_err(|e| {
            tracing::error!("Malformed JSON payload: {}", e);
            ParseError::Malformed {
                kind: "json",
                message: e.to_string(),
            }
        }),
        ContentKind::Xml => xml_to_tree(&raw.body).inspect_err(|e| {
            tracing::error!("{}", e);
        }),
        ContentKind::PlainText => Ok(Value::String(raw.body.clone())),
    }
}

fn lookup<'a>(tree: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(tree, |current, segment| current.get(*segment))
}

fn unexpected_shape(path: &[&str]) -> ParseError {
    ParseError::UnexpectedShape {
        path: path.join("."),
    }
}

fn entity_at(value: &Value, path: &[&str]) -> Result<Parsed, ParseError> {
    match value {
        Value::Object(_) => flatten(value)
            .map(Parsed::Node)
            .ok_or_else(|| unexpected_shape(path)),
        Value::Array(items) => items
            .iter()
            .map(|item| flatten(item).ok_or_else(|| unexpected_shape(path)))
            .collect::<Result<RecordList, _>>()
            .map(Parsed::List),
        _ => Err(unexpected_shape(path)),
    }
}

/// Collapse one entity object into an attribute node.
///
/// Scalars under `@attributes` win; objects without that key contribute their
/// own scalar members. Nested objects and arrays are not attributes.
fn flatten(value: &Value) -> Option<AttributeNode> {
    let map = value.as_object()?;
    let source = match map.get(ATTRIBUTES_KEY) {
        Some(Value::Object(attrs)) => attrs,
        _ => map,
    };

    Some(
        source
            .iter()
            .filter_map(|(key, v)| scalar_text(v).map(|text| (key.clone(), text)))
            .collect(),
    )
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn malformed_xml(message: impl Into<String>) -> ParseError {
    ParseError::Malformed {
        kind: "xml",
        message: message.into(),
    }
}

/// An element still waiting for its closing tag.
struct OpenElement {
    tag: String,
    fields: Map<String, Value>,
    text: String,
}

fn xml_to_tree(xml: &str) -> Result<Value, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    // Open elements, innermost last.
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let fields = start_element(e, reader.decoder())?;
                stack.push(OpenElement {
                    tag: tag_name(e.name().as_ref()),
                    fields,
                    text: String::new(),
                });
            }
            Ok(Event::Empty(ref e)) => {
                let element = OpenElement {
                    tag: tag_name(e.name().as_ref()),
                    fields: start_element(e, reader.decoder())?,
                    text: String::new(),
                };
                close_element(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed_xml("closing tag without an open element"))?;
                close_element(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(ref e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(e));
            }
            Ok(Event::CData(ref e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(e));
            }
            Ok(Event::GeneralRef(ref e)) => {
                push_text(&mut stack, &resolve_reference(e)?);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed_xml(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(malformed_xml(format!("unclosed element <{}>", open.tag)));
    }
    root.ok_or_else(|| malformed_xml("document has no root element"))
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn start_element(e: &BytesStart, decoder: Decoder) -> Result<Map<String, Value>, ParseError> {
    let mut attrs = Map::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed_xml(format!("bad attribute: {}", err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|err| malformed_xml(format!("bad value for attribute '{}': {}", key, err)))?;
        attrs.insert(key, Value::String(value.into_owned()));
    }

    let mut element = Map::new();
    if !attrs.is_empty() {
        element.insert(ATTRIBUTES_KEY.to_string(), Value::Object(attrs));
    }
    Ok(element)
}

/// `&amp;`, `&#39;`, `&#x27;` and the other predefined or character references.
fn resolve_reference(e: &BytesRef) -> Result<String, ParseError> {
    let char_ref = e
        .resolve_char_ref()
        .map_err(|err| malformed_xml(format!("bad character reference: {}", err)))?;
    if let Some(ch) = char_ref {
        return Ok(ch.to_string());
    }

    let name = e
        .decode()
        .map_err(|err| malformed_xml(format!("bad entity reference: {}", err)))?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| malformed_xml(format!("unknown entity &{};", name)))
}

fn close_element(
    stack: &mut [OpenElement],
    root: &mut Option<Value>,
    element: OpenElement,
) -> Result<(), ParseError> {
    let OpenElement { tag, mut fields, text } = element;
    let text = text.trim();
    if !text.is_empty() {
        fields.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
    }

    let value = Value::Object(fields);
    match stack.last_mut() {
        Some(parent) => {
            insert_child(&mut parent.fields, tag, value);
            Ok(())
        }
        None if root.is_some() => Err(malformed_xml("more than one root element")),
        None => {
            let mut doc = Map::new();
            doc.insert(tag, value);
            *root = Some(Value::Object(doc));
            Ok(())
        }
    }
}

/// First occurrence of a tag is stored bare; repeats promote it to an array.
fn insert_child(parent: &mut Map<String, Value>, tag: String, value: Value) {
    match parent.get_mut(&tag) {
        None => {
            parent.insert(tag, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

/// Text is trimmed once, when its element closes; text outside the root is ignored.
fn push_text(stack: &mut [OpenElement], text: &str) {
    if let Some(open) = stack.last_mut() {
        open.text.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coerce::to_list;

    const LEGISLATOR_PATH: &[&str] = &["response", "legislator"];

    #[test]
    fn test_single_and_array_json_have_same_field_access() {
        let single = RawPayload::json(
            r#"{"response":{"legislator":{"@attributes":{"cid":"N00007360","firstlast":"Nancy Pelosi"}}}}"#,
        );
        let pair = RawPayload::json(
            r#"{"response":{"legislator":[
                {"@attributes":{"cid":"N00007360","firstlast":"Nancy Pelosi"}},
                {"@attributes":{"cid":"N00040666","firstlast":"Ro Khanna"}}
            ]}}"#,
        );

        let single = to_list(Some(parse(&single, LEGISLATOR_PATH).unwrap()));
        let pair = to_list(Some(parse(&pair, LEGISLATOR_PATH).unwrap()));

        assert_eq!(single.len(), 1);
        assert_eq!(pair.len(), 2);
        assert_eq!(single.as_slice()[0], pair.as_slice()[0]);
        assert_eq!(pair.as_slice()[1].raw("firstlast"), Some("Ro Khanna"));
    }

    #[test]
    fn test_flat_json_objects_without_attributes_key() {
        let raw = RawPayload::json(r#"{"response":{"summary":{"cand_name":"Pelosi","total":1234.5,"nested":{"x":1}}}}"#);
        let Parsed::Node(node) = parse(&raw, &["response", "summary"]).unwrap() else {
            panic!("expected a bare node");
        };
        assert_eq!(node.raw("cand_name"), Some("Pelosi"));
        assert_eq!(node.raw("total"), Some("1234.5"));
        assert!(!node.contains("nested"));
    }

    #[test]
    fn test_malformed_json() {
        let raw = RawPayload::json(r#"{"response": {"legislator": "#);
        assert!(matches!(
            parse(&raw, LEGISLATOR_PATH),
            Err(ParseError::Malformed { kind: "json", .. })
        ));
    }

    #[test]
    fn test_missing_path_is_unexpected_shape() {
        let raw = RawPayload::json(r#"{"response":{"other":{}}}"#);
        assert_eq!(
            parse(&raw, LEGISLATOR_PATH),
            Err(ParseError::UnexpectedShape {
                path: "response.legislator".to_string()
            })
        );
    }

    #[test]
    fn test_scalar_at_path_is_unexpected_shape() {
        let raw = RawPayload::json(r#"{"response":{"legislator":"nope"}}"#);
        assert!(matches!(
            parse(&raw, LEGISLATOR_PATH),
            Err(ParseError::UnexpectedShape { .. })
        ));
    }

    #[test]
    fn test_lenient_missing_leaf_is_none() {
        let raw = RawPayload::json(r#"{"response":{"contributors":{"@attributes":{"cycle":"2024"}}}}"#);
        let path = &["response", "contributors", "contributor"];
        assert_eq!(parse_lenient(&raw, path), Ok(None));
        // missing parent is still an error
        let raw = RawPayload::json(r#"{"response":{}}"#);
        assert!(parse_lenient(&raw, path).is_err());
    }

    #[test]
    fn test_xml_repeated_elements_become_list() {
        let raw = RawPayload::xml(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <response>
              <legislator cid="N00007360" firstlast="Nancy Pelosi" party="D"/>
              <legislator cid="N00040666" firstlast="Ro Khanna" party="D"/>
            </response>"#,
        );
        let Parsed::List(list) = parse(&raw, LEGISLATOR_PATH).unwrap() else {
            panic!("expected a list");
        };
        assert_eq!(list.len(), 2);
        assert_eq!(list.as_slice()[1].raw("cid"), Some("N00040666"));
    }

    #[test]
    fn test_xml_single_element_is_bare_node() {
        let raw = RawPayload::xml(
            r#"<response><legislator cid="N1" firstlast="AT&amp;T Fan"></legislator></response>"#,
        );
        let Parsed::Node(node) = parse(&raw, LEGISLATOR_PATH).unwrap() else {
            panic!("expected a bare node");
        };
        assert_eq!(node.raw("firstlast"), Some("AT&T Fan"));
    }

    #[test]
    fn test_xml_text_content() {
        let raw = RawPayload::xml("<response><error>  bad key </error></response>");
        let tree = to_tree(&raw).unwrap();
        assert_eq!(tree["response"]["error"][TEXT_KEY], "bad key");
    }

    #[test]
    fn test_xml_character_references_in_attributes() {
        let raw = RawPayload::xml(
            r#"<response>
              <legislator cid="N1" firstlast="Beto O&#39;Rourke"/>
              <legislator cid="N2" firstlast="Jim O&#x27;Hara &amp; Co"/>
            </response>"#,
        );
        let list = to_list(Some(parse(&raw, LEGISLATOR_PATH).unwrap()));
        assert_eq!(list.as_slice()[0].raw("firstlast"), Some("Beto O'Rourke"));
        assert_eq!(list.as_slice()[1].raw("firstlast"), Some("Jim O'Hara & Co"));
    }

    #[test]
    fn test_xml_references_in_text_keep_surrounding_spaces() {
        let raw = RawPayload::xml(
            "<response><error> AT&amp;T key &#39;x&#x27; &lt; 5 </error></response>",
        );
        let tree = to_tree(&raw).unwrap();
        assert_eq!(tree["response"]["error"][TEXT_KEY], "AT&T key 'x' < 5");

        let raw = RawPayload::xml("<response><error>AT &amp; T</error></response>");
        assert_eq!(to_tree(&raw).unwrap()["response"]["error"][TEXT_KEY], "AT & T");
    }

    #[test]
    fn test_xml_whitespace_between_elements_is_not_text() {
        let raw = RawPayload::xml("<response>\n  <legislator cid=\"N1\"/>\n</response>");
        let tree = to_tree(&raw).unwrap();
        assert!(tree["response"].get(TEXT_KEY).is_none());
    }

    #[test]
    fn test_malformed_xml() {
        for body in [
            "<response><legislator></response>",
            "<response>",
            "",
            "<a/><b/>",
        ] {
            let raw = RawPayload::xml(body);
            assert!(
                matches!(parse(&raw, LEGISLATOR_PATH), Err(ParseError::Malformed { kind: "xml", .. })),
                "expected malformed for {:?}",
                body
            );
        }
    }

    #[test]
    fn test_plain_text_wraps_in_singleton() {
        let raw = RawPayload::plain_text("API key is invalid");
        let Parsed::List(list) = parse(&raw, LEGISLATOR_PATH).unwrap() else {
            panic!("expected a list");
        };
        assert_eq!(list.len(), 1);
        assert_eq!(list.as_slice()[0].raw(PLAIN_TEXT_FIELD), Some("API key is invalid"));
    }
}
