// ms-translator - Microsoft Translator API client
// Author: kelexine (https://github.com/kelexine)

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod oauth;
pub mod store;
pub mod translation;
pub mod utils;

pub use client::{LanguageCodes, Response, TranslatorClient};
pub use config::TranslatorConfig;
pub use error::{Result, TranslatorError};
