//! XML wire codec.
//!
//! Request and response types declare their wire names with serde attributes
//! (`rename`, `rename_all = "kebab-case"`), so each type's field-to-element
//! table lives next to the type. This module turns those types into gateway XML
//! documents and back.
//!
//! Presence rules:
//!
//! - encoding: `Option` fields are skipped when `None` and
//!   [`Nullable`](crate::nullable::Nullable) fields are skipped when unset.
//! - decoding: a missing element, an empty element and an element marked
//!   `nil="true"` all mean "absent". Type hints such as `type="integer"` are
//!   ignored.

use std::{fmt, str::FromStr};

use quick_xml::{Reader, events::Event};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::error::{GatewayError, Result, ValidationErrors};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Encodes a request into an XML document.
///
/// The root element is the serde name of `T`.
///
/// # Errors
///
/// Returns [`GatewayError::Encode`] if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let body = quick_xml::se::to_string(value).map_err(|e| GatewayError::Encode(e.to_string()))?;
    let mut document = String::with_capacity(XML_DECLARATION.len() + body.len());
    document.push_str(XML_DECLARATION);
    document.push_str(&body);
    Ok(document.into_bytes())
}

/// Decodes an XML document into `T`.
///
/// # Errors
///
/// Returns [`GatewayError::Decode`] if the body is not UTF-8 or does not match `T`.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(body)
        .map_err(|e| GatewayError::Decode(format!("response is not UTF-8: {e}")))?;
    quick_xml::de::from_str(text).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// A type that is a whole gateway document, not just a fragment.
pub trait Document: DeserializeOwned {
    /// Root element name, e.g. `subscription`.
    const ROOT: &'static str;
}

/// Decodes a complete document after checking its root element.
///
/// [`decode`] takes any root, since serde ignores the outer element name; this
/// refuses a body that is some other document (another resource, or an
/// `api-error-response` sent with a success status).
///
/// # Errors
///
/// Returns [`GatewayError::Decode`] if the root element is not `T::ROOT` or the
/// body does not match `T`.
pub fn decode_document<T: Document>(body: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(body)
        .map_err(|e| GatewayError::Decode(format!("response is not UTF-8: {e}")))?;
    let root = root_element(text)?;
    if root != T::ROOT {
        return Err(GatewayError::Decode(format!("expected a <{}> document, got <{root}>", T::ROOT)));
    }
    decode(body)
}

fn root_element(text: &str) -> Result<String> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(GatewayError::Decode("response has no root element".into())),
            Ok(_) => {}
            Err(e) => return Err(GatewayError::Decode(format!("malformed response: {e}"))),
        }
    }
}

/// Deserializes an optional scalar element.
///
/// Missing, empty and `nil` elements become `None`; any other text is parsed with
/// [`FromStr`]. Use with `#[serde(default, deserialize_with = "codec::optional")]`.
///
/// # Errors
///
/// Fails if the element text does not parse as `T`.
pub fn optional<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let text: Option<String> = Option::deserialize(deserializer)?;
    match text.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Deserializes a plain boolean whose absence means `false`.
///
/// # Errors
///
/// Fails if the element text is not a boolean.
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(optional::<D, bool>(deserializer)?.unwrap_or(false))
}

/// Serde helper for `skip_serializing_if` on plain booleans.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "signature required by serde")]
pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Parses an `api-error-response` document into field-addressable errors.
///
/// The gateway nests errors by resource:
///
/// ```xml
/// <api-error-response>
///   <errors>
///     <subscription>
///       <errors type="array">
///         <error>
///           <code>91904</code>
///           <attribute type="symbol">plan_id</attribute>
///           <message>Plan ID is invalid.</message>
///         </error>
///       </errors>
///     </subscription>
///   </errors>
///   <message>Plan ID is invalid.</message>
/// </api-error-response>
/// ```
///
/// Each `<error>` is keyed by its resource path plus attribute
/// (`subscription.plan_id`); errors on `base` are keyed by the resource path.
///
/// # Errors
///
/// Returns [`GatewayError::Decode`] if the document is malformed.
pub fn parse_error_response(body: &[u8]) -> Result<ValidationErrors> {
    let text = std::str::from_utf8(body)
        .map_err(|e| GatewayError::Decode(format!("error response is not UTF-8: {e}")))?;
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<String> = Vec::new();
    let mut text_buf = String::new();
    let mut current: Option<PendingError> = None;
    let mut message = String::new();
    let mut collected: Vec<(String, PendingError)> = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if stack.is_empty() {
                    saw_root = name == "api-error-response";
                }
                if name == "error" {
                    current = Some(PendingError::default());
                }
                stack.push(name);
                text_buf.clear();
            }
            Ok(Event::Empty(_)) => text_buf.clear(),
            Ok(Event::Text(t)) => {
                let raw = String::from_utf8_lossy(&t);
                let unescaped = quick_xml::escape::unescape(&raw)
                    .map_err(|e| GatewayError::Decode(format!("bad escape in error response: {e}")))?;
                text_buf.push_str(&unescaped);
            }
            Ok(Event::CData(t)) => text_buf.push_str(&String::from_utf8_lossy(&t)),
            Ok(Event::GeneralRef(r)) => {
                let name = String::from_utf8_lossy(&r);
                if let Some(resolved) = resolve_reference(&name) {
                    text_buf.push_str(&resolved);
                }
            }
            Ok(Event::End(_)) => {
                let Some(name) = stack.pop() else {
                    return Err(GatewayError::Decode("unbalanced error response".into()));
                };
                let value = text_buf.trim().to_owned();
                text_buf.clear();

                if name == "error" {
                    if let Some(pending) = current.take() {
                        let path = field_path(&stack, &pending.attribute);
                        collected.push((path, pending));
                    }
                    continue;
                }

                match (name.as_str(), current.as_mut()) {
                    ("code", Some(pending)) => pending.code = value,
                    ("attribute", Some(pending)) => pending.attribute = value,
                    ("message", Some(pending)) => pending.message = value,
                    ("message", None) if stack.len() == 1 => message = value,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(GatewayError::Decode(format!("malformed error response: {e}"))),
        }
    }

    if !saw_root {
        return Err(GatewayError::Decode("expected an api-error-response document".into()));
    }

    let mut errors = ValidationErrors::new(message);
    for (path, pending) in collected {
        errors.push(path, pending.code, pending.attribute, pending.message);
    }
    Ok(errors)
}

#[derive(Debug, Default)]
struct PendingError {
    code: String,
    attribute: String,
    message: String,
}

/// Joins the open resource elements (skipping the envelope and `errors`
/// containers) with the attribute. `base` errors belong to the resource itself.
fn field_path(stack: &[String], attribute: &str) -> String {
    let mut segments: Vec<&str> = stack
        .iter()
        .map(String::as_str)
        .filter(|name| *name != "api-error-response" && *name != "errors")
        .collect();
    if !attribute.is_empty() && attribute != "base" {
        segments.push(attribute);
    }
    segments.join(".")
}

fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    quick_xml::escape::resolve_predefined_entity(name).map(str::to_owned)
}
