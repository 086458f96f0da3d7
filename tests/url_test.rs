//! URL Helper Tests
//!
//! The exact edge-case matrix for host extraction and rewriting,
//! including the malformed forms that must pass through untouched.

use depotnet::url::{extract_host, rewrite_url, strip_brackets};

#[test]
fn test_extract_host() {
    assert_eq!(extract_host("http://localhost:3128"), "localhost");
    assert_eq!(extract_host("http://localhost/foo"), "localhost");
    assert_eq!(extract_host("http://localhost"), "localhost");
    assert_eq!(extract_host("http://127.0.0.1"), "127.0.0.1");
    assert_eq!(extract_host("http://[::1]"), "[::1]");
    assert_eq!(extract_host("http://[::1]:3128"), "[::1]");
    assert_eq!(extract_host("http://[::1]/foo"), "[::1]");
    assert_eq!(extract_host(""), "");
    assert_eq!(extract_host("localhost"), "");
    assert_eq!(extract_host("http:/"), "");
    assert_eq!(extract_host("http://"), "");
    assert_eq!(extract_host("http://:"), "");
    assert_eq!(extract_host("http://["), "");
    assert_eq!(extract_host("http://[]"), "[]");
}

#[test]
fn test_rewrite_url() {
    assert_eq!(
        rewrite_url("http://localhost:3128", "127.0.0.1"),
        "http://127.0.0.1:3128"
    );
    assert_eq!(
        rewrite_url("http://localhost:3128", "[::1]"),
        "http://[::1]:3128"
    );
    assert_eq!(
        rewrite_url("http://localhost/foo", "127.0.0.1"),
        "http://127.0.0.1/foo"
    );
    assert_eq!(rewrite_url("http://localhost", "127.0.0.1"), "http://127.0.0.1");
    assert_eq!(rewrite_url("http://127.0.0.1", "127.0.0.1"), "http://127.0.0.1");
    assert_eq!(rewrite_url("http://[::1]", "127.0.0.1"), "http://127.0.0.1");
    assert_eq!(
        rewrite_url("http://[::1]:3128", "127.0.0.1"),
        "http://127.0.0.1:3128"
    );
    assert_eq!(
        rewrite_url("http://[::1:3128", "127.0.0.1"),
        "http://[::1:3128"
    );
    assert_eq!(rewrite_url("http://[::1", "127.0.0.1"), "http://[::1");
    assert_eq!(rewrite_url("", "127.0.0.1"), "");
    assert_eq!(rewrite_url("http", "127.0.0.1"), "http");
    assert_eq!(rewrite_url("http:/", "127.0.0.1"), "http:/");
    assert_eq!(rewrite_url("http://", "127.0.0.1"), "http://");
    assert_eq!(rewrite_url("http://:", "127.0.0.1"), "http://:");
    assert_eq!(rewrite_url("http:///", "127.0.0.1"), "http:///");
    assert_eq!(rewrite_url("http://[", "127.0.0.1"), "http://[");
    assert_eq!(rewrite_url("http://[]", "127.0.0.1"), "http://127.0.0.1");
    assert_eq!(rewrite_url("file:///foo/bar", "127.0.0.1"), "file:///foo/bar");
}

#[test]
fn test_strip_brackets() {
    assert_eq!(strip_brackets("[::1]"), "::1");
    assert_eq!(strip_brackets("127.0.0.1"), "127.0.0.1");
    assert_eq!(strip_brackets("[]"), "");
    assert_eq!(strip_brackets(""), "");
    assert_eq!(strip_brackets("["), "[");
    assert_eq!(strip_brackets("]"), "]");
    assert_eq!(strip_brackets("[::1"), "[::1");
    assert_eq!(strip_brackets("::1"), "::1");
}

#[test]
fn test_rewrite_with_own_host_round_trips() {
    for url in [
        "http://localhost:3128",
        "http://localhost/foo",
        "http://127.0.0.1",
        "http://[::1]:3128/path",
        "https://mirror.example.com:8000/data/chunk",
    ] {
        let host = extract_host(url);
        assert!(!host.is_empty());
        assert_eq!(rewrite_url(url, host), url);
    }
}
