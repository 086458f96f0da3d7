//! URL host parsing and rewriting.
//!
//! The request-routing layer pins a request to a resolved address by
//! swapping the host portion of a URL in place. These helpers implement
//! that sub-language directly on the input string: unlike a full URL
//! parser they never normalize, so malformed inputs (`http://[`,
//! `http://[]`) round-trip byte-for-byte instead of being rejected or
//! rewritten.
//!
//! All three functions are pure and deterministic.

/// Returns the host portion of `url`, or the empty string if there is
/// none.
///
/// The input must start with `scheme://` for a non-empty scheme. A host
/// beginning with `[` extends up to and including the next `]` (brackets
/// retained); otherwise it runs to the first `:`, `/`, or end of string.
/// The degenerate `http://[]` yields `[]`.
pub fn extract_host(url: &str) -> &str {
    let Some(pos) = url.find("://") else {
        return "";
    };
    if pos == 0 {
        return "";
    }
    let rest = &url[pos + 3..];
    if let Some(body) = rest.strip_prefix('[') {
        match body.find(']') {
            Some(end) => &rest[..end + 2],
            None => "",
        }
    } else {
        let end = rest.find([':', '/']).unwrap_or(rest.len());
        &rest[..end]
    }
}

/// Returns `url` with its host replaced by `new_host`, preserving scheme,
/// port, and path. Inputs without an extractable host (including
/// `file:///...` forms) pass through unchanged.
pub fn rewrite_url(url: &str, new_host: &str) -> String {
    let host = extract_host(url);
    if host.is_empty() {
        return url.to_string();
    }
    let Some(pos) = url.find("://") else {
        return url.to_string();
    };
    let start = pos + 3;
    let mut rewritten = String::with_capacity(url.len() - host.len() + new_host.len());
    rewritten.push_str(&url[..start]);
    rewritten.push_str(new_host);
    rewritten.push_str(&url[start + host.len()..]);
    rewritten
}

/// Removes surrounding `[` `]` from an IPv6 literal. Anything that is not
/// fully bracketed comes back unchanged.
pub fn strip_brackets(s: &str) -> &str {
    s.strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(s)
}
