//! Integration tests for the proxy-backed subtitle source and word lookup
//!
//! A minimal HTTP responder on localhost plays the proxy service; each test
//! scripts its responses per path and inspects the requests it received.

use flixfluent_core::SubtitleCue;
use flixfluent_proxy::*;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Canned response for one endpoint path
#[derive(Clone)]
struct Canned {
    status: u16,
    body: String,
}

fn ok(body: &str) -> Canned {
    Canned {
        status: 200,
        body: body.to_string(),
    }
}

/// Serve `routes` keyed by `path?query`, falling back to the bare path, else 404
async fn start_fake_proxy(routes: HashMap<String, Canned>) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_task = Arc::clone(&seen);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            let seen = Arc::clone(&seen_task);
            tokio::spawn(async move {
                let mut buffer = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&buffer);
                let target = request
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                seen.lock().unwrap().push(target.clone());

                let path = target.split('?').next().unwrap_or("/").to_string();
                let canned = routes
                    .get(&target)
                    .or_else(|| routes.get(&path))
                    .cloned()
                    .unwrap_or(Canned {
                        status: 404,
                        body: r#"{"error":"not found"}"#.to_string(),
                    });

                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    canned.status,
                    canned.body.len(),
                    canned.body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, seen)
}

fn client_for(addr: SocketAddr) -> ProxyClient {
    ProxyClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap()
}

/// Address nothing listens on
async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

// ============================================================================
// SUBTITLE SOURCE TESTS
// ============================================================================

#[tokio::test]
async fn test_unreachable_proxy_yields_fallback_subtitles() {
    let client = ProxyClient::new(
        &format!("http://{}", closed_addr().await),
        Duration::from_secs(2),
    )
    .unwrap();
    let source = ProxySubtitleSource::new(client);

    let cues = source.fetch("abc", "auto").await;
    assert_eq!(cues, fallback_subtitles());
}

#[tokio::test]
async fn test_subtitles_in_preferred_language() {
    let mut routes = HashMap::new();
    routes.insert(
        "/subtitles?videoId=abc&lang=ko".to_string(),
        ok(r#"{"subtitles":[{"start":"0","dur":"2.5","text":"안녕"},{"start":3,"text":"네"}]}"#),
    );
    let (addr, seen) = start_fake_proxy(routes).await;
    let source = ProxySubtitleSource::new(client_for(addr));

    let cues = source.fetch("abc", "ko").await;
    assert_eq!(
        cues,
        vec![
            SubtitleCue::new(0.0, 2.5, "안녕"),
            SubtitleCue::new(3.0, 8.0, "네")
        ]
    );
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_languages_tried_in_order_until_one_has_cues() {
    let mut routes = HashMap::new();
    routes.insert(
        "/subtitles?videoId=abc&lang=ja".to_string(),
        ok(r#"{"error":"No captions in ja"}"#),
    );
    routes.insert(
        "/subtitles?videoId=abc&lang=ko".to_string(),
        ok(r#"{"subtitles":[]}"#),
    );
    routes.insert(
        "/subtitles?videoId=abc&lang=en".to_string(),
        ok(r#"{"subtitles":[{"start":1,"dur":1,"text":"Hello"}]}"#),
    );
    let (addr, seen) = start_fake_proxy(routes).await;
    let source = ProxySubtitleSource::new(client_for(addr));

    let cues = source.fetch("abc", "ja").await;
    assert_eq!(cues, vec![SubtitleCue::new(1.0, 2.0, "Hello")]);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "/subtitles?videoId=abc&lang=ja",
            "/subtitles?videoId=abc&lang=ko",
            "/subtitles?videoId=abc&lang=en",
        ]
    );
}

#[tokio::test]
async fn test_every_language_failing_yields_fallback() {
    let mut routes = HashMap::new();
    routes.insert(
        "/subtitles".to_string(),
        Canned {
            status: 500,
            body: r#"{"error":"boom"}"#.to_string(),
        },
    );
    let (addr, seen) = start_fake_proxy(routes).await;
    let source = ProxySubtitleSource::new(client_for(addr));

    let cues = source.fetch("abc", "ko").await;
    assert_eq!(cues.len(), 9);
    assert_eq!(cues[0].text, "안녕하세요");
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_malformed_body_degrades_to_fallback() {
    let mut routes = HashMap::new();
    routes.insert("/subtitles".to_string(), ok("<html>not json</html>"));
    let (addr, _) = start_fake_proxy(routes).await;
    let source = ProxySubtitleSource::with_fallback(
        client_for(addr),
        vec![SubtitleCue::new(0.0, 1.0, "fallback")],
    );

    let cues = source.fetch("abc", "auto").await;
    assert_eq!(cues, vec![SubtitleCue::new(0.0, 1.0, "fallback")]);
}

#[tokio::test]
async fn test_fetch_language_reports_empty_result() {
    let mut routes = HashMap::new();
    routes.insert("/subtitles".to_string(), ok(r#"{"subtitles":[]}"#));
    let (addr, _) = start_fake_proxy(routes).await;
    let source = ProxySubtitleSource::new(client_for(addr));

    let error = source.fetch_language("abc", "ko").await.unwrap_err();
    assert_eq!(error.error_code(), "EMPTY_RESULT");
}

// ============================================================================
// WORD LOOKUP TESTS
// ============================================================================

#[tokio::test]
async fn test_word_analysis_from_proxy() {
    let mut routes = HashMap::new();
    routes.insert(
        "/analyze-word".to_string(),
        ok(r#"{
            "romanization": "hakgyo",
            "partOfSpeech": "noun",
            "meaning": ["school"],
            "deconstruction": [{"component": "학교", "explanation": "school"}],
            "examples": [{"korean": "학교에 가요.", "english": "I go to school."}]
        }"#),
    );
    let (addr, seen) = start_fake_proxy(routes).await;
    let lookup = ProxyWordLookup::new(client_for(addr));

    let analysis = lookup.lookup("학교", "school").await;
    assert_eq!(analysis.romanization, "hakgyo");
    assert_eq!(analysis.part_of_speech, "noun");
    assert_eq!(analysis.examples.len(), 1);

    let target = seen.lock().unwrap()[0].clone();
    assert!(target.starts_with("/analyze-word?word=%ED%95%99%EA%B5%90"));
}

#[tokio::test]
async fn test_word_analysis_failure_yields_no_analysis_record() {
    let client = ProxyClient::new(
        &format!("http://{}", closed_addr().await),
        Duration::from_secs(2),
    )
    .unwrap();
    let lookup = ProxyWordLookup::new(client);

    let analysis = lookup.lookup("안녕하세요", "Hello").await;
    assert_eq!(analysis.romanization, "안녕하세요");
    assert_eq!(analysis.part_of_speech, "unknown");
    assert_eq!(analysis.meaning, vec!["Hello"]);
    assert_eq!(analysis.deconstruction.len(), 1);
    assert_eq!(analysis.examples[0].english, "No examples available.");
}

#[tokio::test]
async fn test_translation_from_proxy_and_error_field() {
    let mut routes = HashMap::new();
    routes.insert(
        "/translate-openai?word=%ED%95%98%EB%A3%A8".to_string(),
        ok(r#"{"translation":{"translatedText":"day","pronunciation":"haru"}}"#),
    );
    routes.insert(
        "/translate-openai".to_string(),
        ok(r#"{"error":"quota exceeded"}"#),
    );
    let (addr, _) = start_fake_proxy(routes).await;
    let lookup = ProxyWordLookup::new(client_for(addr));

    let translation = lookup.translate("하루").await;
    assert_eq!(translation.translated_text, "day");
    assert_eq!(translation.pronunciation.as_deref(), Some("haru"));
    assert!(translation.examples.is_empty());

    let translation = lookup.translate("다음").await;
    assert_eq!(translation, WordTranslation::unavailable());
}
