// Shared test fixtures
// Author: kelexine (https://github.com/kelexine)

#![allow(dead_code)]

use ms_translator::config::{StoreKind, TranslatorConfig};
use ms_translator::http::{HttpRequest, RawResult, Transport};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

/// Transport answering from a script and recording every request.
#[derive(Default)]
pub struct ScriptedTransport {
    answers: Mutex<VecDeque<RawResult>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(answers: Vec<RawResult>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> RawResult {
        self.requests.lock().push(request.clone());
        self.answers
            .lock()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted request to {}", request.url))
    }
}

pub fn ok(body: &str) -> RawResult {
    status(200, body)
}

pub fn status(status: u16, body: &str) -> RawResult {
    RawResult::Response {
        status,
        body: body.to_string(),
        latency_ms: 7,
    }
}

/// Subscription-key configuration caching tokens in `dir`.
pub fn file_config(dir: &Path, key: &str) -> TranslatorConfig {
    let mut config = TranslatorConfig::default();
    config.auth.subscription_key = Some(key.to_string());
    config.store.kind = StoreKind::File;
    config.store.dir = Some(dir.to_path_buf());
    config
}

pub const FLEISCH: &str =
    r#"<string xmlns="http://schemas.microsoft.com/2003/10/Serialization/">Fleisch</string>"#;

pub const DOG_CAT: &str = r#"<ArrayOfTranslateArrayResponse xmlns="http://schemas.datacontract.org/2004/07/Microsoft.MT.Web.Service.V2" xmlns:i="http://www.w3.org/2001/XMLSchema-instance"><TranslateArrayResponse><From>en</From><OriginalTextSentenceLengths xmlns:a="http://schemas.microsoft.com/2003/10/Serialization/Arrays"><a:int>3</a:int></OriginalTextSentenceLengths><State/><TranslatedText>chien</TranslatedText><TranslatedTextSentenceLengths xmlns:a="http://schemas.microsoft.com/2003/10/Serialization/Arrays"><a:int>5</a:int></TranslatedTextSentenceLengths></TranslateArrayResponse><TranslateArrayResponse><From>en</From><OriginalTextSentenceLengths xmlns:a="http://schemas.microsoft.com/2003/10/Serialization/Arrays"><a:int>3</a:int></OriginalTextSentenceLengths><State/><TranslatedText>chat</TranslatedText><TranslatedTextSentenceLengths xmlns:a="http://schemas.microsoft.com/2003/10/Serialization/Arrays"><a:int>4</a:int></TranslatedTextSentenceLengths></TranslateArrayResponse></ArrayOfTranslateArrayResponse>"#;

pub const LANGUAGE_NAMES: &str = r#"<ArrayOfstring xmlns="http://schemas.microsoft.com/2003/10/Serialization/Arrays" xmlns:i="http://www.w3.org/2001/XMLSchema-instance"><string>Anglais</string><string/><string>Français</string></ArrayOfstring>"#;

pub const SENTENCE_LENGTHS: &str = r#"<ArrayOfint xmlns="http://schemas.microsoft.com/2003/10/Serialization/Arrays" xmlns:i="http://www.w3.org/2001/XMLSchema-instance"><int>16</int><int>17</int><int>29</int></ArrayOfint>"#;

pub const DETECTED: &str = r#"<ArrayOfstring xmlns="http://schemas.microsoft.com/2003/10/Serialization/Arrays" xmlns:i="http://www.w3.org/2001/XMLSchema-instance"><string>en</string><string>fr</string></ArrayOfstring>"#;
