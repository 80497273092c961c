// Translation payloads - request builders and answer normalization
// Author: kelexine (https://github.com/kelexine)

pub mod request;
pub mod response;
mod xml;

pub use request::{ContentType, TranslateOptions, DEFAULT_CATEGORY};
pub use response::{normalize, DecodeContext, DecodedBody, ResponseShape};
