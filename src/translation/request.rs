// Request payload builders
// Author: kelexine (https://github.com/kelexine)

use crate::http::Params;
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::fmt;

const SERVICE_NS: &str = "http://schemas.datacontract.org/2004/07/Microsoft.MT.Web.Service.V2";
const ARRAYS_NS: &str = "http://schemas.microsoft.com/2003/10/Serialization/Arrays";
const INSTANCE_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Default translation category.
pub const DEFAULT_CATEGORY: &str = "general";

/// Format of the text sent for translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[default]
    #[serde(rename = "text/plain")]
    Plain,
    #[serde(rename = "text/html")]
    Html,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Plain => "text/plain",
            ContentType::Html => "text/html",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional settings shared by `translate` and `translate_array`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateOptions {
    /// Source language; detected by the service when absent.
    pub from: Option<String>,
    pub content_type: ContentType,
    pub category: String,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            from: None,
            content_type: ContentType::Plain,
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl TranslateOptions {
    pub fn source_language(mut self, language: impl Into<String>) -> Self {
        self.from = Some(language.into());
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

pub fn translate_params(text: &str, to: &str, options: &TranslateOptions) -> Params {
    let mut pairs = vec![
        ("text".to_string(), text.to_string()),
        ("to".to_string(), to.to_string()),
        ("contentType".to_string(), options.content_type.to_string()),
        ("category".to_string(), options.category.clone()),
    ];
    if let Some(from) = &options.from {
        pairs.push(("from".to_string(), from.clone()));
    }
    Params::Pairs(pairs)
}

pub fn detect_params(text: &str) -> Params {
    Params::pairs([("text", text)])
}

pub fn break_sentences_params(text: &str, language: &str) -> Params {
    Params::pairs([("text", text), ("language", language)])
}

pub fn transform_params(sentence: &str, language: &str, category: &str) -> Params {
    Params::pairs([
        ("sentence", sentence),
        ("language", language),
        ("category", category),
    ])
}

/// Wraps `text` in CDATA sections, splitting any `]]>` it contains.
pub fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

/// `TranslateArrayRequest` document.
pub fn translate_array_body(texts: &[String], to: &str, options: &TranslateOptions) -> String {
    let mut xml = String::from("<TranslateArrayRequest><AppId/>");
    xml.push_str(&format!(
        "<From>{}</From>",
        escape(options.from.as_deref().unwrap_or_default())
    ));
    xml.push_str("<Options>");
    xml.push_str(&format!(
        "<Category xmlns=\"{}\">{}</Category>",
        SERVICE_NS,
        escape(&options.category)
    ));
    xml.push_str(&format!(
        "<ContentType xmlns=\"{}\">{}</ContentType>",
        SERVICE_NS, options.content_type
    ));
    for empty in ["ReservedFlags", "State", "Uri", "User"] {
        xml.push_str(&format!("<{} xmlns=\"{}\" />", empty, SERVICE_NS));
    }
    xml.push_str("</Options><Texts>");
    for text in texts {
        xml.push_str(&format!("<string xmlns=\"{}\">{}</string>", ARRAYS_NS, cdata(text)));
    }
    xml.push_str(&format!("</Texts><To>{}</To></TranslateArrayRequest>", escape(to)));
    xml
}

/// `ArrayOfstring` document used by `DetectArray` and `GetLanguageNames`.
pub fn array_of_string_body(items: &[String]) -> String {
    let mut xml = format!(
        "<ArrayOfstring xmlns=\"{}\" xmlns:i=\"{}\">",
        ARRAYS_NS, INSTANCE_NS
    );
    for item in items {
        xml.push_str(&format!("<string>{}</string>", escape(item)));
    }
    xml.push_str("</ArrayOfstring>");
    xml
}
