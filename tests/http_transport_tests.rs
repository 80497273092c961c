// HTTP transport tests against a local mock server
// Author: kelexine (https://github.com/kelexine)

use mockito::Matcher;
use ms_translator::config::HttpConfig;
use ms_translator::http::{
    HttpRequest, HttpTransport, Method, Params, RawResult, Transport, TransportErrorKind,
};

fn transport() -> HttpTransport {
    HttpTransport::new(&HttpConfig::default()).unwrap()
}

#[test]
fn test_get_sends_pairs_as_query() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", Matcher::Regex(r"^/V2/Http\.svc/Translate".to_string()))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("text".into(), "the dog".into()),
            Matcher::UrlEncoded("to".into(), "fr".into()),
            Matcher::UrlEncoded("appId".into(), "".into()),
        ]))
        .match_header("authorization", "Bearer tok")
        .match_header("content-type", "text/xml")
        .with_status(200)
        .with_body("<string xmlns=\"x\">le chien</string>")
        .expect(1)
        .create();

    let raw = transport().get(
        &format!("{}/V2/Http.svc/Translate", server.url()),
        Some("tok"),
        Params::pairs([("text", "the dog"), ("to", "fr"), ("appId", "")]),
    );

    mock.assert();
    assert_eq!(raw.status(), Some(200));
    assert_eq!(raw.body(), Some("<string xmlns=\"x\">le chien</string>"));
}

#[test]
fn test_post_sends_raw_body() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", Matcher::Regex(r"^/DetectArray".to_string()))
        .match_header("content-type", "text/xml")
        .match_body("<ArrayOfstring><string>hi</string></ArrayOfstring>")
        .with_status(200)
        .with_body("ok")
        .expect(1)
        .create();

    let raw = transport().post(
        &format!("{}/DetectArray", server.url()),
        Some("tok"),
        Params::Raw("<ArrayOfstring><string>hi</string></ArrayOfstring>".to_string()),
    );

    mock.assert();
    assert!(raw.is_success());
}

#[test]
fn test_post_pairs_are_form_encoded() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/token")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
            Matcher::UrlEncoded("scope".into(), "http://api.microsofttranslator.com".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token":"abc"}"#)
        .expect(1)
        .create();

    let request = HttpRequest::new(Method::Post, format!("{}/token", server.url()))
        .content_type(None)
        .params(Params::pairs([
            ("grant_type", "client_credentials"),
            ("scope", "http://api.microsofttranslator.com"),
        ]));
    let raw = transport().send(&request);

    mock.assert();
    assert_eq!(raw.status(), Some(200));
}

#[test]
fn test_form_content_type_replaces_requested_one() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/token")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::UrlEncoded("client_id".into(), "dumb".into()))
        .with_status(200)
        .expect(1)
        .create();

    let request = HttpRequest::new(Method::Post, format!("{}/token", server.url()))
        .content_type(Some("text/xml"))
        .params(Params::pairs([("client_id", "dumb")]));
    let raw = transport().send(&request);

    mock.assert();
    assert!(raw.is_success());
}

#[test]
fn test_custom_headers_and_empty_body() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/issueToken")
        .match_header("ocp-apim-subscription-key", "my-key")
        .match_header("content-length", "0")
        .with_status(200)
        .with_body("token")
        .expect(1)
        .create();

    let request = HttpRequest::new(Method::Post, format!("{}/issueToken", server.url()))
        .content_type(None)
        .header("Ocp-Apim-Subscription-Key", "my-key");
    let raw = transport().send(&request);

    mock.assert();
    assert_eq!(raw.body(), Some("token"));
}

#[test]
fn test_error_statuses_are_returned_not_raised() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("DELETE", "/thing")
        .with_status(400)
        .with_body("bad")
        .create();

    let raw = transport().delete(&format!("{}/thing", server.url()), None, Params::Empty);

    assert_eq!(raw.status(), Some(400));
    assert!(!raw.is_success());
    assert_eq!(raw.body(), Some("bad"));
}

#[test]
fn test_unreachable_host_is_a_transport_failure() {
    let raw = transport().get("http://127.0.0.1:1/Translate", None, Params::Empty);

    match raw {
        RawResult::TransportFailure { kind, message, .. } => {
            assert_eq!(kind, TransportErrorKind::Connect);
            assert!(!message.is_empty());
        }
        other => panic!("expected a transport failure, got {:?}", other),
    }
}
