//! Raw host answer normalization.
//!
//! The host's proxy-resolution service answers in PAC vocabulary, and the
//! vocabulary varies by platform: direct connections are always `DIRECT`,
//! while a proxy is announced by a keyword (`PROXY`, `HTTPS` for HTTPS
//! upstreams on some platforms, `SOCKS4`/`SOCKS5` for SOCKS) followed by a
//! `host:port` endpoint. This module absorbs those differences and turns one
//! raw answer into at most one canonical `protocol=host:port;` fragment.

use crate::rules::{fragment, Protocol};

/// Converts one raw host answer into zero or one rule string fragment.
///
/// `DIRECT` and unrecognized answers yield nothing; at most one fragment is
/// emitted per protocol. For SOCKS the keywords are inspected in priority
/// order `SOCKS5`, `SOCKS4`, `PROXY`, and the first match wins.
pub fn normalize_answer(protocol: Protocol, answer: &str) -> Option<String> {
    let answer = answer.trim();
    if answer.is_empty() || answer == "DIRECT" {
        return None;
    }

    let keywords: &[&str] = match protocol {
        Protocol::Http | Protocol::Ftp => &["PROXY"],
        // Windows labels an HTTPS upstream with HTTPS where Linux answers
        // PROXY for both; either keyword marks the endpoint.
        Protocol::Https => &["PROXY", "HTTPS"],
        Protocol::Socks => &["SOCKS5", "SOCKS4", "PROXY"],
    };

    let endpoint = keywords
        .iter()
        .find_map(|keyword| endpoint_after(answer, keyword))?;

    Some(fragment(protocol, endpoint))
}

/// Returns the endpoint following a keyword, if the keyword occurs.
///
/// The endpoint runs from just after the keyword to the next `;` (the host
/// may append fallback directives such as `; DIRECT`).
fn endpoint_after<'a>(answer: &'a str, keyword: &str) -> Option<&'a str> {
    let (_, rest) = answer.split_once(keyword)?;
    let endpoint = rest.split(';').next().unwrap_or("").trim();
    if endpoint.is_empty() {
        return None;
    }
    Some(endpoint)
}
