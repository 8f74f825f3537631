//! Integration tests for the reporter's wire behavior.
//!
//! A throwaway TCP listener stands in for the Overwatch backend so the tests
//! can inspect exactly what goes over the wire and script the response.

use overwatch_sensor::config::Config;
use overwatch_sensor::report::{BlockingReporter, TransportError};
use overwatch_sensor::sampler::Reading;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

/// What the fake backend saw for one request.
struct CapturedRequest {
    head: String,
    body: serde_json::Value,
}

/// Serve exactly one HTTP exchange, answering with the given status line,
/// and hand the captured request back through a channel.
fn one_shot_backend(status_line: &'static str) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");

        // Read until the end of headers, then the declared body length.
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let header_end = loop {
            let n = stream.read(&mut chunk).expect("read request");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length: usize = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.trim().eq_ignore_ascii_case("content-length") {
                    value.trim().parse().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).expect("read body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let body = serde_json::from_slice(&buf[header_end..header_end + content_length])
            .unwrap_or(serde_json::Value::Null);

        let response = format!("{status_line}\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{{}}");
        stream.write_all(response.as_bytes()).expect("write response");
        let _ = stream.flush();

        let _ = tx.send(CapturedRequest { head, body });
    });

    (format!("http://{addr}/api/live/update"), rx)
}

fn reading() -> Reading {
    Reading {
        busyness_score: 60,
        occupancy: 10,
        movement_score: 8,
    }
}

#[test]
fn test_report_posts_exact_payload_and_returns_status() {
    let (api_url, rx) = one_shot_backend("HTTP/1.1 201 Created");

    let mut config = Config::default();
    config.api_url = api_url;
    config.location_id = "loc-42".to_string();
    config.sensor_api_key = Some("test-key".to_string());

    let reporter = BlockingReporter::new(&config).expect("create reporter");
    let status = reporter.report(&reading()).expect("report");
    assert_eq!(status, 201);

    let request = rx.recv().expect("captured request");
    let head = request.head.to_lowercase();
    assert!(head.starts_with("post /api/live/update http/1.1"));
    assert!(head.contains("x-api-key: test-key"));
    assert!(head.contains("content-type: application/json"));

    let object = request.body.as_object().expect("JSON object body");
    assert_eq!(object.len(), 4);
    assert_eq!(object["locationId"], "loc-42");
    assert_eq!(object["busynessScore"], 60);
    assert_eq!(object["occupancy"], 10);
    assert_eq!(object["movementScore"], 8);
}

#[test]
fn test_api_key_header_absent_when_unconfigured() {
    let (api_url, rx) = one_shot_backend("HTTP/1.1 201 Created");

    let mut config = Config::default();
    config.api_url = api_url;

    let reporter = BlockingReporter::new(&config).expect("create reporter");
    reporter.report(&reading()).expect("report");

    let request = rx.recv().expect("captured request");
    assert!(!request.head.to_lowercase().contains("x-api-key"));
}

#[test]
fn test_non_2xx_status_is_not_a_transport_error() {
    let (api_url, _rx) = one_shot_backend("HTTP/1.1 500 Internal Server Error");

    let mut config = Config::default();
    config.api_url = api_url;

    let reporter = BlockingReporter::new(&config).expect("create reporter");
    // The update was delivered; a server-side failure is logged, not retried.
    assert_eq!(reporter.report(&reading()).unwrap(), 500);
}

#[test]
fn test_connection_refused_is_a_recoverable_transport_error() {
    // Grab a free port, then close the listener so nothing answers.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let mut config = Config::default();
    config.api_url = format!("http://{addr}/api/live/update");

    let reporter = BlockingReporter::new(&config).expect("create reporter");
    match reporter.report(&reading()) {
        Err(TransportError::Network(_)) => {}
        other => panic!("expected a network error, got {other:?}"),
    }

    // The reporter stays usable for the next tick.
    let (api_url, _rx) = one_shot_backend("HTTP/1.1 201 Created");
    let mut config = Config::default();
    config.api_url = api_url;
    let reporter = BlockingReporter::new(&config).expect("create reporter");
    assert_eq!(reporter.report(&reading()).unwrap(), 201);
}
