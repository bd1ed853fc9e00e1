#![cfg(feature = "remote")]

mod common;

use std::io::Cursor;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use intl_catalog::{Arg, HttpLoader, I18nError, RemoteConfig, Translator};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue};
use tiny_http::{Header, Response, Server};

use common::tag;

type Hits = Arc<Mutex<Vec<(String, Option<String>)>>>;

/// Serves `routes` as `(path, status, body)` until idle for a moment.
fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> (String, Hits) {
    serve_with(move |path| match routes.iter().find(|(route, _, _)| *route == path) {
        Some((_, status, body)) => Response::from_string(*body).with_status_code(*status),
        None => Response::from_string("").with_status_code(404),
    })
}

fn serve_with<F>(respond: F) -> (String, Hits)
where
    F: Fn(&str) -> Response<Cursor<Vec<u8>>> + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("http server");
    let url = format!("http://{}", server.server_addr());
    let hits: Hits = Arc::default();

    let seen = Arc::clone(&hits);
    thread::spawn(move || {
        while let Ok(Some(request)) = server.recv_timeout(Duration::from_secs(2)) {
            let api_key = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("X-Api-Key"))
                .map(|h| h.value.as_str().to_string());
            seen.lock().push((request.url().to_string(), api_key));

            let response = respond(request.url());
            let _ = request.respond(response);
        }
    });

    (url, hits)
}

fn paths(hits: &Hits) -> Vec<String> {
    hits.lock().iter().map(|(path, _)| path.clone()).collect()
}

#[test]
fn initial_load_overrides_local_entries() -> anyhow::Result<()> {
    let (url, _) = serve(vec![
        ("/en", 200, r#"[{"key": "Published", "translation": "Foo"}]"#),
        ("/ru", 200, r#"[{"key": "Published", "translation": "Буу"}, {"key": "test", "translation": "Тост %s"}]"#),
    ]);

    let translator = Translator::builder()
        .default_locale("ru")
        .loader(HttpLoader::new(&url, HeaderMap::new())?)
        .build(&common::source())?;

    assert_eq!(translator.render(&tag("en"), "Published", &[]), "Foo");
    assert_eq!(translator.render(&tag("ru"), "Published", &[]), "Буу");
    assert_eq!(translator.render(&tag("ru"), "test", &[Arg::from("был")]), "Тост был");
    assert_eq!(translator.render(&tag("en"), "test", &[Arg::from("x")]), "Test of the x");
    Ok(())
}

#[test]
fn refresh_overlays_new_values() -> anyhow::Result<()> {
    let (first, _) = serve(vec![
        ("/en", 200, r#"[{"key": "Published", "translation": "Foo"}]"#),
        ("/ru", 200, r#"[{"key": "Published", "translation": "Буу"}]"#),
    ]);
    let translator = Translator::builder()
        .default_locale("ru")
        .loader(HttpLoader::new(&first, HeaderMap::new())?)
        .build(&common::source())?;

    let (second, _) = serve(vec![
        ("/en", 200, r#"[{"key": "Published", "translation": "Bar"}]"#),
        (
            "/ru",
            200,
            r#"[{"key": "Published", "translation": "Бяя"},
                {"key": "test plural", "plural": {"other": "%d пауков", "=1": "один паук"}}]"#,
        ),
    ]);
    translator.set_loader(HttpLoader::new(&second, HeaderMap::new())?);
    translator.refresh()?;

    assert_eq!(translator.render(&tag("en"), "Published", &[]), "Bar");
    assert_eq!(translator.render(&tag("ru"), "Published", &[]), "Бяя");
    assert_eq!(translator.render(&tag("ru"), "test plural", &[Arg::from(1)]), "один паук");
    assert_eq!(translator.render(&tag("en"), "test plural", &[Arg::from(2)]), "just pair of spiders");
    assert_eq!(translator.render(&tag("ru"), "test", &[Arg::from("пива")]), "Тест пива");
    Ok(())
}

#[test]
fn sends_caller_headers() -> anyhow::Result<()> {
    let (url, hits) = serve(vec![("/en", 200, "[]"), ("/ru", 200, "[]")]);
    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", HeaderValue::from_static("secret"));

    Translator::builder()
        .loader(HttpLoader::new(&url, headers)?)
        .build(&common::source())?;

    let hits = hits.lock().clone();
    assert_eq!(
        hits,
        vec![
            ("/en".to_string(), Some("secret".to_string())),
            ("/ru".to_string(), Some("secret".to_string())),
        ]
    );
    Ok(())
}

#[test]
fn non_200_fails_fast() -> anyhow::Result<()> {
    let (url, hits) = serve(vec![("/ru", 200, "[]")]);

    let err = Translator::builder()
        .loader(HttpLoader::new(&url, HeaderMap::new())?)
        .build(&common::source())
        .unwrap_err();

    assert!(matches!(err.root(), I18nError::InvalidResponseStatus(404)));
    assert!(err.to_string().contains("load translation for en"));
    assert_eq!(paths(&hits), vec!["/en".to_string()]);
    Ok(())
}

#[test]
fn failed_refresh_keeps_earlier_locales() -> anyhow::Result<()> {
    let translator = common::translator();
    let (url, _) = serve(vec![
        ("/en", 200, r#"[{"key": "test", "translation": "Refreshed %s"}]"#),
        ("/ru", 500, "oops"),
    ]);
    translator.set_loader(HttpLoader::new(&url, HeaderMap::new())?);

    let err = translator.refresh().unwrap_err();
    assert!(matches!(err.root(), I18nError::InvalidResponseStatus(500)));
    assert!(err.to_string().starts_with("refresh translations: load translation for ru"));

    assert_eq!(translator.render(&tag("en"), "test", &[Arg::from("x")]), "Refreshed x");
    assert_eq!(translator.render(&tag("ru"), "test", &[Arg::from("x")]), "Тест x");
    Ok(())
}

#[test]
fn remote_cannot_introduce_locales() -> anyhow::Result<()> {
    let (url, hits) = serve(vec![
        ("/de", 200, r#"[{"key": "test", "translation": "Prüfung %s"}]"#),
        ("/en", 200, "[]"),
        ("/ru", 200, "[]"),
    ]);
    let translator = common::translator();
    translator.set_loader(HttpLoader::new(&url, HeaderMap::new())?);
    translator.refresh()?;

    assert_eq!(paths(&hits), vec!["/en".to_string(), "/ru".to_string()]);
    assert_eq!(translator.supported_locales(), vec![tag("en"), tag("ru")]);
    assert_eq!(translator.render(&tag("de"), "test", &[Arg::from("x")]), "Тест x");
    Ok(())
}

#[test]
fn malformed_payload_is_decode_error() -> anyhow::Result<()> {
    let (url, _) = serve(vec![("/en", 200, r#"{"key": "not an array"}"#)]);
    let translator = common::translator();
    translator.set_loader(HttpLoader::new(&url, HeaderMap::new())?);

    let err = translator.refresh().unwrap_err();
    assert!(matches!(err.root(), I18nError::Decode(_)));
    Ok(())
}

#[test]
fn unreachable_server_is_network_error() -> anyhow::Result<()> {
    let port = TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
    let translator = common::translator();
    translator.set_loader(HttpLoader::new(&format!("http://127.0.0.1:{port}"), HeaderMap::new())?);

    let err = translator.refresh().unwrap_err();
    assert!(matches!(err.root(), I18nError::Network(_)));
    Ok(())
}

#[test]
fn oversized_headers_are_rejected() -> anyhow::Result<()> {
    let (url, _) = serve_with(|_| {
        let padding = Header::from_bytes("X-Padding", "a".repeat(4 * 1024)).expect("header");
        Response::from_string("[]").with_header(padding)
    });
    let translator = common::translator();
    translator.set_loader(HttpLoader::new(&url, HeaderMap::new())?);

    let err = translator.refresh().unwrap_err();
    assert!(matches!(err.root(), I18nError::Network(_)));
    assert!(err.to_string().contains("load translation for en"));
    assert!(err.to_string().contains("response headers exceed 3072 bytes"));
    Ok(())
}

#[test]
fn oversized_body_is_rejected() -> anyhow::Result<()> {
    let body = format!(r#"[{{"key": "test", "translation": "{}"}}]"#, "x".repeat(256));
    let (url, _) = serve_with(move |_| Response::from_string(body.clone()));
    let config = RemoteConfig {
        base_url: url,
        max_body_bytes: 64,
        ..RemoteConfig::default()
    };
    let translator = common::translator();
    translator.set_loader(HttpLoader::from_config(&config)?);

    let err = translator.refresh().unwrap_err();
    assert!(matches!(err.root(), I18nError::Network(_)));
    assert!(err.to_string().contains("load translation for en"));
    assert!(err.to_string().contains("response body exceeds 64 bytes"));
    assert_eq!(translator.render(&tag("en"), "test", &[Arg::from("x")]), "Test of the x");
    Ok(())
}
