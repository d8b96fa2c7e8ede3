//! Host proxy lookup seam.
//!
//! The system resolver probes the host's proxy-resolution service once per
//! protocol through the [`ProxyLookup`] trait. Desktop hosts hand this to
//! whatever resolution primitive they have; [`EnvProxyLookup`] is the default
//! adapter, answering from the conventional proxy environment variables.

use async_trait::async_trait;

use crate::error::{ProxyError, Result};

/// Resolves one probe URL to a raw PAC-style answer.
///
/// Answers use the host vocabulary the normalizer understands: `DIRECT`,
/// `PROXY host:port`, `HTTPS host:port`, `SOCKS4 host:port`,
/// `SOCKS5 host:port`. The host service is assumed to cache internally;
/// no caching happens at this seam.
#[async_trait]
pub trait ProxyLookup: Send + Sync {
    /// Resolves the proxy answer for one probe URL.
    async fn resolve(&self, probe_url: &str) -> Result<String>;
}

/// Proxy lookup backed by the process environment.
///
/// Reads the conventional `http_proxy` / `https_proxy` / `ftp_proxy` /
/// `socks_proxy` / `all_proxy` variables (either casing) and translates them
/// into PAC-style answers. An unset variable means a direct connection.
#[derive(Debug, Clone, Default)]
pub struct EnvProxyLookup;

impl EnvProxyLookup {
    /// Creates a new environment-backed lookup.
    pub fn new() -> EnvProxyLookup {
        EnvProxyLookup
    }
}

#[async_trait]
impl ProxyLookup for EnvProxyLookup {
    async fn resolve(&self, probe_url: &str) -> Result<String> {
        let (scheme, _) = probe_url.split_once("://").ok_or_else(|| {
            ProxyError::Lookup(format!("probe URL has no scheme: {probe_url}"))
        })?;

        for key in env_keys_for_scheme(scheme) {
            if let Ok(value) = std::env::var(key) {
                if let Some(answer) = pac_answer(&value) {
                    return Ok(answer);
                }
            }
        }

        Ok("DIRECT".to_string())
    }
}

/// Environment variables consulted for a probe scheme, in priority order.
fn env_keys_for_scheme(scheme: &str) -> &'static [&'static str] {
    match scheme {
        "http" => &["http_proxy", "HTTP_PROXY", "all_proxy", "ALL_PROXY"],
        "https" => &["https_proxy", "HTTPS_PROXY", "all_proxy", "ALL_PROXY"],
        "ftp" => &["ftp_proxy", "FTP_PROXY", "all_proxy", "ALL_PROXY"],
        "socks" | "socks4" | "socks5" => {
            &["socks_proxy", "SOCKS_PROXY", "all_proxy", "ALL_PROXY"]
        }
        _ => &[],
    }
}

/// Translates one proxy environment value into a PAC-style answer.
///
/// `socks5://host:port` becomes `SOCKS5 host:port`, `socks4://` likewise;
/// any other value (with or without a URL scheme) becomes
/// `PROXY host:port`. Empty values yield nothing.
fn pac_answer(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (keyword, endpoint) = match value.split_once("://") {
        Some(("socks5", rest)) => ("SOCKS5", rest),
        Some(("socks4", rest)) => ("SOCKS4", rest),
        Some(("socks", rest)) => ("SOCKS5", rest),
        Some((_, rest)) => ("PROXY", rest),
        None => ("PROXY", value),
    };

    let endpoint = endpoint.trim_end_matches('/');
    if endpoint.is_empty() {
        return None;
    }

    Some(format!("{keyword} {endpoint}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_endpoint_becomes_proxy_answer() {
        assert_eq!(
            pac_answer("proxy.corp:3128").as_deref(),
            Some("PROXY proxy.corp:3128")
        );
    }

    #[test]
    fn http_url_becomes_proxy_answer() {
        assert_eq!(
            pac_answer("http://proxy.corp:3128/").as_deref(),
            Some("PROXY proxy.corp:3128")
        );
    }

    #[test]
    fn socks_urls_keep_their_version() {
        assert_eq!(
            pac_answer("socks5://10.0.0.1:1080").as_deref(),
            Some("SOCKS5 10.0.0.1:1080")
        );
        assert_eq!(
            pac_answer("socks4://10.0.0.1:1080").as_deref(),
            Some("SOCKS4 10.0.0.1:1080")
        );
        assert_eq!(
            pac_answer("socks://10.0.0.1:1080").as_deref(),
            Some("SOCKS5 10.0.0.1:1080")
        );
    }

    #[test]
    fn empty_values_yield_nothing() {
        assert_eq!(pac_answer(""), None);
        assert_eq!(pac_answer("   "), None);
        assert_eq!(pac_answer("http://"), None);
    }

    #[test]
    fn scheme_env_keys() {
        assert_eq!(env_keys_for_scheme("http")[0], "http_proxy");
        assert_eq!(env_keys_for_scheme("socks4")[0], "socks_proxy");
        assert!(env_keys_for_scheme("gopher").is_empty());
    }

    #[tokio::test]
    async fn probe_url_without_scheme_is_an_error() {
        let lookup = EnvProxyLookup::new();
        let err = lookup.resolve("www.example.com").await.unwrap_err();
        assert!(matches!(err, ProxyError::Lookup(_)));
    }
}
