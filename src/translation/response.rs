//! Service answer normalization.
//!
//! The translation service answers the same logical operation with one of
//! several payload formats: a single XML `string`, an XML array of strings,
//! integers or translation tuples, or JSON. [`normalize`] recognizes the
//! format with an ordered table of root element prefixes and decodes it into a
//! [`DecodedBody`]. Formats are mutually exclusive, so the first match wins.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use super::xml::{collect_items, root_text};
use crate::error::{Result, TranslatorError};
use crate::http::RawResult;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

/// Payload formats the service is known to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// `<string ...>value</string>`
    Text,
    /// `<ArrayOfTranslateArrayResponse ...>`
    Translations,
    /// `<ArrayOfstring ...>`
    Strings,
    /// `<ArrayOfint ...>`: sentence lengths of the source text.
    SentenceLengths,
    /// Anything else, decoded as JSON when possible.
    Json,
}

struct ShapeMatcher {
    prefix: &'static str,
    shape: ResponseShape,
}

/// Recognized root elements, in priority order.
const SHAPE_MATCHERS: &[ShapeMatcher] = &[
    ShapeMatcher { prefix: "<string ", shape: ResponseShape::Text },
    ShapeMatcher { prefix: "<ArrayOfTranslateArrayResponse ", shape: ResponseShape::Translations },
    ShapeMatcher { prefix: "<ArrayOfstring ", shape: ResponseShape::Strings },
    ShapeMatcher { prefix: "<ArrayOfint ", shape: ResponseShape::SentenceLengths },
];

const UTF8_BOM: char = '\u{feff}';

/// Decoded payload of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    Text(String),
    List(Vec<String>),
    /// `(original input, result)` pairs in request order. Duplicate inputs
    /// keep one entry each.
    Mapping(Vec<(String, String)>),
    /// Consecutive substrings of the source text.
    Sentences(Vec<String>),
    Json(serde_json::Value),
}

impl DecodedBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedBody::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Items of a `List` or `Sentences` body.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            DecodedBody::List(items) | DecodedBody::Sentences(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(String, String)]> {
        match self {
            DecodedBody::Mapping(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            DecodedBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Result for `original` in a `Mapping` body.
    pub fn get(&self, original: &str) -> Option<&str> {
        self.as_mapping()?
            .iter()
            .find(|(key, _)| key == original)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        match self {
            DecodedBody::Text(_) | DecodedBody::Json(_) => 1,
            DecodedBody::List(items) | DecodedBody::Sentences(items) => items.len(),
            DecodedBody::Mapping(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Mappings serialize as JSON objects, everything else as its natural value.
impl Serialize for DecodedBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DecodedBody::Text(text) => serializer.serialize_str(text),
            DecodedBody::List(items) | DecodedBody::Sentences(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DecodedBody::Mapping(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            DecodedBody::Json(value) => value.serialize(serializer),
        }
    }
}

/// What an operation knows about the answer it is about to decode.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub expected: ResponseShape,
    /// Inputs of a batch operation, in request order.
    pub originals: Option<&'a [String]>,
    /// Source text sentence lengths refer to.
    pub source_text: Option<&'a str>,
}

impl<'a> DecodeContext<'a> {
    pub fn new(expected: ResponseShape) -> Self {
        Self {
            expected,
            originals: None,
            source_text: None,
        }
    }

    pub fn with_originals(mut self, originals: &'a [String]) -> Self {
        self.originals = Some(originals);
        self
    }

    pub fn with_source_text(mut self, source_text: &'a str) -> Self {
        self.source_text = Some(source_text);
        self
    }
}

/// Format of `body` according to [`SHAPE_MATCHERS`].
pub fn detect_shape(body: &str) -> ResponseShape {
    SHAPE_MATCHERS
        .iter()
        .find(|matcher| body.starts_with(matcher.prefix))
        .map(|matcher| matcher.shape)
        .unwrap_or(ResponseShape::Json)
}

/// Turns one transport outcome into a decoded body or an error.
pub fn normalize(raw: &RawResult, context: &DecodeContext<'_>) -> Result<DecodedBody> {
    if let Some(err) = TranslatorError::from_raw(raw) {
        return Err(err);
    }

    let body = raw.body().unwrap_or_default();
    let shape = detect_shape(body);

    if shape != context.expected && !(shape == ResponseShape::Json && context.expected == ResponseShape::Text) {
        warn!(
            "Expected a {:?} answer but received {:?}; decoding as received",
            context.expected, shape
        );
    }

    debug!("Decoding {:?} answer ({} bytes)", shape, body.len());

    match shape {
        ResponseShape::Text => root_text(body).map(DecodedBody::Text),
        ResponseShape::Translations => {
            let translations = collect_items(body, "TranslateArrayResponse", Some("TranslatedText"))?;
            Ok(pair_with_originals(translations, context.originals))
        }
        ResponseShape::Strings => {
            let strings = collect_items(body, "string", None)?;
            Ok(pair_with_originals(strings, context.originals))
        }
        ResponseShape::SentenceLengths => {
            let source = context.source_text.ok_or_else(|| {
                TranslatorError::Decode("Sentence lengths received without a source text".to_string())
            })?;
            let lengths = collect_items(body, "int", None)?
                .iter()
                .map(|length| {
                    length.trim().parse::<usize>().map_err(|e| {
                        TranslatorError::Decode(format!("Invalid sentence length {:?}: {}", length, e))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(DecodedBody::Sentences(slice_sentences(source, &lengths)))
        }
        ResponseShape::Json => Ok(decode_json(body)),
    }
}

/// JSON value of `body`, or `body` unmodified when it is not JSON.
fn decode_json(body: &str) -> DecodedBody {
    match serde_json::from_str(body.trim_start_matches(UTF8_BOM)) {
        Ok(value) => DecodedBody::Json(value),
        Err(_) => DecodedBody::Text(body.to_string()),
    }
}

/// Pairs batch results with the inputs they answer.
///
/// Results beyond the inputs are keyed by their index.
pub fn pair_with_originals(results: Vec<String>, originals: Option<&[String]>) -> DecodedBody {
    let Some(originals) = originals else {
        return DecodedBody::List(results);
    };

    if results.len() != originals.len() {
        warn!(
            "Received {} results for {} inputs",
            results.len(),
            originals.len()
        );
    }

    DecodedBody::Mapping(
        results
            .into_iter()
            .enumerate()
            .map(|(i, result)| {
                let key = originals.get(i).cloned().unwrap_or_else(|| i.to_string());
                (key, result)
            })
            .collect(),
    )
}

/// Cuts `text` into consecutive substrings of `lengths` characters.
///
/// A length running past the end of the text is cut short and every later
/// slice is empty.
pub fn slice_sentences(text: &str, lengths: &[usize]) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut start = 0usize;
    let mut truncated = false;

    let sentences = lengths
        .iter()
        .map(|&length| {
            let wanted = start.saturating_add(length);
            let end = wanted.min(chars.len());
            truncated |= wanted > end;
            let sentence: String = chars[start..end].iter().collect();
            start = end;
            sentence
        })
        .collect();

    if truncated {
        warn!(
            "Sentence lengths {:?} exceed the {} characters of the source text",
            lengths,
            chars.len()
        );
    }

    sentences
}
