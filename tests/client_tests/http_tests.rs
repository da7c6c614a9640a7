//! HTTP Transport Tests
//!
//! Runs calls against a local mock HTTP server.
//!
//! Tests verify:
//! - Requests are POSTed with the packager's content type
//! - Non-2xx statuses and connection failures map to their error kinds
//! - A resolver can redirect the dial address

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::{json, Value};
use yar_client::dns::StaticResolver;
use yar_client::network::{HttpTransport, Transport};
use yar_client::protocol::{encode_envelope, Header};
use yar_client::{Client, ClientConfig, DnsCacheConfig, ErrorKind, Packager, Response};

/// Framed OK response carrying `result`
fn ok_envelope(packager: Packager, result: &Value) -> Vec<u8> {
    let body = Response::with_result(1, packager, result)
        .unwrap()
        .pack(packager)
        .unwrap();
    let mut header = Header::new();
    header.id = 1;
    header.packager = packager.wire_name();
    encode_envelope(&mut header, &body).unwrap()
}

#[test]
fn test_http_call_json() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(ok_envelope(Packager::Json, &json!({"hello": 123})))
        .create();

    let client = Client::new(&format!("{}/api", server.url()), ClientConfig::default()).unwrap();
    let ret: Value = client
        .call("api", vec![json!("a"), json!("b"), json!("c"), json!({"d": "leo"})])
        .unwrap();

    assert_eq!(ret, json!({"hello": 123}));
    mock.assert();
}

#[test]
fn test_http_call_msgpack() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/msgpack")
        .with_body(ok_envelope(Packager::MsgPack, &json!([1, 2, 3])))
        .create();

    let config = ClientConfig::builder().packager(Packager::MsgPack).build();
    let client = Client::new(&format!("{}/", server.url()), config).unwrap();
    let ret: Vec<u32> = client.call("list", vec![]).unwrap();

    assert_eq!(ret, vec![1, 2, 3]);
    mock.assert();
}

#[test]
fn test_http_remote_exception() {
    let body = Response::exception("boom").pack(Packager::Json).unwrap();
    let mut header = Header::new();
    header.packager = Packager::Json.wire_name();
    let envelope = encode_envelope(&mut header, &body).unwrap();

    let mut server = mockito::Server::new();
    let _mock = server.mock("POST", "/").with_body(envelope).create();

    let client = Client::new(&format!("{}/", server.url()), ClientConfig::default()).unwrap();
    let err = client.call::<Value>("api", vec![]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Response);
    assert_eq!(err.message(), "boom");
}

#[test]
fn test_http_error_status_is_request_error() {
    let mut server = mockito::Server::new();
    let _mock = server.mock("POST", "/").with_status(500).create();

    let client = Client::new(&format!("{}/", server.url()), ClientConfig::default()).unwrap();
    let err = client.call::<Value>("api", vec![]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Request);
    assert!(err.message().contains("500"), "{}", err);
}

#[test]
fn test_http_non_yar_body_is_response_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/")
        .with_body("<html>hello</html>")
        .create();

    let client = Client::new(&format!("{}/", server.url()), ClientConfig::default()).unwrap();
    let err = client.call::<Value>("api", vec![]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Response);
}

#[test]
fn test_http_connection_refused_is_network_error() {
    let config = ClientConfig::builder().timeout_ms(500).build();
    let client = Client::new("http://127.0.0.1:1/", config).unwrap();

    let err = client.call::<Value>("api", vec![]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

fn mock_port(server: &mockito::Server) -> String {
    server
        .host_with_port()
        .rsplit_once(':')
        .map(|(_, port)| port.to_string())
        .unwrap()
}

#[test]
fn test_http_resolver_redirects_dial_address() {
    let mut server = mockito::Server::new();
    let port = mock_port(&server);
    let mock = server
        .mock("POST", "/")
        .match_header("host", format!("yar.test:{}", port).as_str())
        .with_body(ok_envelope(Packager::Json, &json!("resolved")))
        .expect(2)
        .create();
    let url = format!("http://yar.test:{}/", port);

    let resolver = StaticResolver::new();
    resolver.add("yar.test", vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);

    let config = ClientConfig::default();
    let transport = Arc::new(
        HttpTransport::new(&url, &config)
            .unwrap()
            .with_resolver(Arc::new(resolver)),
    );
    assert_eq!(transport.pinned_addrs(), None);

    let client = Client::with_transport(&url, config, transport.clone()).unwrap();
    for _ in 0..2 {
        let ret: String = client.call("api", vec![]).unwrap();
        assert_eq!(ret, "resolved");
    }

    // The URL keeps the domain; only the dialed address comes from the resolver
    assert_eq!(transport.url().host_str(), Some("yar.test"));
    assert_eq!(
        transport.pinned_addrs(),
        Some(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
    );
    mock.assert();
}

#[test]
fn test_http_resolver_change_is_followed() {
    let mut server = mockito::Server::new();
    let port = mock_port(&server);
    let _mock = server
        .mock("POST", "/")
        .with_body(ok_envelope(Packager::Json, &json!(1)))
        .create();
    let url = format!("http://yar.test:{}/", port);

    let resolver = Arc::new(StaticResolver::new());
    resolver.add("yar.test", vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);

    let config = ClientConfig::builder().timeout_ms(500).build();
    let transport = Arc::new(
        HttpTransport::new(&url, &config)
            .unwrap()
            .with_resolver(resolver.clone()),
    );
    let client = Client::with_transport(&url, config, transport.clone()).unwrap();
    let ret: u32 = client.call("api", vec![]).unwrap();
    assert_eq!(ret, 1);

    // Nothing listens on 127.0.0.2, so the call must now fail to connect
    let moved = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2));
    resolver.add("yar.test", vec![moved]);

    let err = client.call::<u32>("api", vec![]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(transport.pinned_addrs(), Some(vec![moved]));
    assert_eq!(transport.url().host_str(), Some("yar.test"));
}

#[test]
fn test_https_resolver_keeps_url_host() {
    let resolver = StaticResolver::new();
    resolver.add("secure.test", vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);

    let config = ClientConfig::builder().timeout_ms(500).build();
    let transport = HttpTransport::new("https://secure.test:1/rpc", &config)
        .unwrap()
        .with_resolver(Arc::new(resolver));

    // Connection is refused, but the address was resolved and pinned without
    // touching the URL that TLS verifies against
    assert!(transport.send(Bytes::new(), "application/json").is_err());
    assert_eq!(transport.url().as_str(), "https://secure.test:1/rpc");
    assert_eq!(
        transport.pinned_addrs(),
        Some(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
    );
}

#[test]
fn test_http_resolver_failure_is_network_error() {
    let config = ClientConfig::default();
    let transport = HttpTransport::new("http://missing.test/", &config)
        .unwrap()
        .with_resolver(Arc::new(StaticResolver::new()));

    let err = match transport.send(Bytes::new(), "application/json") {
        Ok(_) => panic!("lookup of an unknown host succeeded"),
        Err(err) => err,
    };
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[test]
fn test_http_with_dns_cache_config() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .with_body(ok_envelope(Packager::Json, &json!(7)))
        .expect(2)
        .create();

    let config = ClientConfig::builder()
        .dns_cache(DnsCacheConfig {
            max_entries: 8,
            ttl_ms: Duration::from_secs(30).as_millis() as u64,
        })
        .keep_alive(true)
        .build();
    let client = Client::new(&format!("{}/", server.url()), config).unwrap();

    for _ in 0..2 {
        let ret: u32 = client.call("api", vec![]).unwrap();
        assert_eq!(ret, 7);
    }
    mock.assert();
}

#[test]
fn test_http_invalid_url_is_param_error() {
    let err = HttpTransport::new("http://exa mple.com/", &ClientConfig::default())
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Param);
}
