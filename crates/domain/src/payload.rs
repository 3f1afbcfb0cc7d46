//! Encoded request bodies and expected response bodies.
//!
//! A [`Payload`] is either literal text, literal bytes, or a structured value
//! that still has to be serialized. Literal forms are passed through as-is,
//! so callers can compare against hand-written JSON or XML.

use serde::Serialize;

use crate::error::DomainResult;

/// Expected body content for JSON and XML comparisons.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a, T: ?Sized = ()> {
    /// Literal text, used verbatim.
    Text(&'a str),
    /// Literal bytes, used verbatim.
    Bytes(&'a [u8]),
    /// A value encoded on demand.
    Value(&'a T),
}

impl<'a> Payload<'a, ()> {
    /// Literal text payload.
    #[must_use]
    pub const fn text(text: &'a str) -> Self {
        Self::Text(text)
    }

    /// Literal byte payload.
    #[must_use]
    pub const fn bytes(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<T: Serialize + ?Sized> Payload<'_, T> {
    /// Resolve the payload to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if a structured value fails to serialize.
    pub fn to_json(&self) -> DomainResult<Vec<u8>> {
        match self {
            Self::Text(text) => Ok(text.as_bytes().to_vec()),
            Self::Bytes(bytes) => Ok(bytes.to_vec()),
            Self::Value(value) => encode_json(*value),
        }
    }

    /// Resolve the payload to XML bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if a structured value fails to serialize.
    pub fn to_xml(&self) -> DomainResult<Vec<u8>> {
        match self {
            Self::Text(text) => Ok(text.as_bytes().to_vec()),
            Self::Bytes(bytes) => Ok(bytes.to_vec()),
            Self::Value(value) => encode_xml(*value),
        }
    }
}

impl<'a, T: Serialize> From<&'a T> for Payload<'a, T> {
    fn from(value: &'a T) -> Self {
        Self::Value(value)
    }
}

/// Serialize `value` as compact JSON.
///
/// # Errors
///
/// Returns an error if the value cannot be represented as JSON.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> DomainResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Serialize `value` as an XML document fragment.
///
/// The root element is named after the type, the way `quick-xml` names
/// top-level structs.
///
/// # Errors
///
/// Returns an error if the value cannot be represented as XML.
pub fn encode_xml<T: Serialize + ?Sized>(value: &T) -> DomainResult<Vec<u8>> {
    Ok(quick_xml::se::to_string(value)?.into_bytes())
}

/// Outcome of comparing a response body against a JSON expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonComparison {
    /// Both sides parse and are semantically equal.
    Equal,
    /// The expectation was non-empty but the body was empty.
    EmptyBody,
    /// The expected side is not valid JSON.
    InvalidExpected(String),
    /// The body is not valid JSON.
    InvalidActual(String),
    /// Both sides parse but differ.
    Different,
}

/// Compare two JSON documents, ignoring key order and formatting.
#[must_use]
pub fn compare_json(expected: &[u8], actual: &[u8]) -> JsonComparison {
    if !expected.is_empty() && actual.is_empty() {
        return JsonComparison::EmptyBody;
    }

    let expected: serde_json::Value = match serde_json::from_slice(expected) {
        Ok(value) => value,
        Err(e) => return JsonComparison::InvalidExpected(e.to_string()),
    };
    let actual: serde_json::Value = match serde_json::from_slice(actual) {
        Ok(value) => value,
        Err(e) => return JsonComparison::InvalidActual(e.to_string()),
    };

    if expected == actual {
        JsonComparison::Equal
    } else {
        JsonComparison::Different
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename = "testPerson")]
    struct TestPerson {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Age")]
        age: u32,
    }

    fn person() -> TestPerson {
        TestPerson {
            name: "Some".to_string(),
            age: 30,
        }
    }

    #[test]
    fn test_value_to_json() {
        let p = person();
        let json = Payload::from(&p).to_json().unwrap();
        assert_eq!(String::from_utf8(json).unwrap(), r#"{"Name":"Some","Age":30}"#);
    }

    #[test]
    fn test_value_to_xml() {
        let p = person();
        let xml = Payload::from(&p).to_xml().unwrap();
        assert_eq!(
            String::from_utf8(xml).unwrap(),
            "<testPerson><Name>Some</Name><Age>30</Age></testPerson>"
        );
    }

    #[test]
    fn test_unencodable_values() {
        let tuple_keys = std::collections::HashMap::from([((1, 2), "x")]);
        assert!(matches!(
            Payload::from(&tuple_keys).to_json(),
            Err(DomainError::JsonEncode(_))
        ));

        let rootless = std::collections::HashMap::from([("Name", "Some")]);
        assert!(matches!(
            Payload::from(&rootless).to_xml(),
            Err(DomainError::XmlEncode(_))
        ));
    }

    #[test]
    fn test_literal_payloads_pass_through() {
        assert_eq!(Payload::text("{\"a\": 1}").to_json().unwrap(), b"{\"a\": 1}".to_vec());
        assert_eq!(Payload::bytes(b"<a/>").to_xml().unwrap(), b"<a/>".to_vec());
    }

    #[test]
    fn test_compare_json_ignores_order_and_whitespace() {
        assert_eq!(
            compare_json(br#"{"Age": 30, "Name": "Some"}"#, br#"{"Name":"Some","Age":30}"#),
            JsonComparison::Equal
        );
        assert_eq!(
            compare_json(br#"{"Age": 20, "Name": "Some"}"#, br#"{"Name":"Some","Age":30}"#),
            JsonComparison::Different
        );
    }

    #[test]
    fn test_compare_json_empty_body() {
        assert_eq!(compare_json(b"{}", b""), JsonComparison::EmptyBody);
    }

    #[test]
    fn test_compare_json_invalid_sides() {
        assert!(matches!(
            compare_json(b"{not json", b"{}"),
            JsonComparison::InvalidExpected(_)
        ));
        assert!(matches!(
            compare_json(b"{}", b"<xml/>"),
            JsonComparison::InvalidActual(_)
        ));
    }
}
