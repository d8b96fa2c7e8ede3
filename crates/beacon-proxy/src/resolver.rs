//! System proxy resolution.
//!
//! One resolution cycle probes the host's proxy-resolution service for each
//! protocol concurrently, normalizes the answers, merges them into a single
//! rule string, and persists it. With the "use system proxy" setting on, the
//! detected string also becomes the active rule set.

use tracing::{debug, warn};

use beacon_storage::Database;

use crate::error::Result;
use crate::lookup::ProxyLookup;
use crate::normalize::normalize_answer;
use crate::rules::Protocol;

/// Settings key for the active (user-facing) rule string.
pub const PROXY_RULES_KEY: &str = "proxyRules";

/// Settings key for the system-detected rule string.
pub const SYSTEM_PROXY_RULES_KEY: &str = "systemProxyRules";

/// Settings key for the "use system proxy" toggle.
pub const USE_SYSTEM_PROXY_KEY: &str = "useSystemProxy";

/// Representative host probed once per protocol.
const PROBE_HOST: &str = "www.example.com";

/// Builds the probe URL for one protocol.
///
/// The SOCKS probe uses the `socks4` scheme; the host service answers with
/// the SOCKS version it actually supports and the normalizer sorts that out.
fn probe_url(protocol: Protocol) -> String {
    let scheme = match protocol {
        Protocol::Http => "http",
        Protocol::Https => "https",
        Protocol::Ftp => "ftp",
        Protocol::Socks => "socks4",
    };
    format!("{scheme}://{PROBE_HOST}")
}

/// Detects the host's per-protocol proxy assignments and persists them.
pub struct SystemProxyResolver<L> {
    db: Database,
    lookup: L,
}

impl<L: ProxyLookup> SystemProxyResolver<L> {
    /// Creates a resolver over a settings database and a host lookup.
    pub fn new(db: Database, lookup: L) -> Self {
        Self { db, lookup }
    }

    /// Runs one resolution cycle.
    ///
    /// The four protocol lookups are issued concurrently and all must settle
    /// before the merge; a failed lookup degrades that protocol to "no
    /// proxy" rather than aborting the cycle. The merged rule string is
    /// written to [`SYSTEM_PROXY_RULES_KEY`] unconditionally and copied to
    /// [`PROXY_RULES_KEY`] when [`USE_SYSTEM_PROXY_KEY`] is set. Storage
    /// errors are fatal to the cycle and propagate.
    pub async fn resolve_system_proxy(&self) -> Result<()> {
        let (http, https, ftp, socks) = tokio::join!(
            self.probe(Protocol::Http),
            self.probe(Protocol::Https),
            self.probe(Protocol::Ftp),
            self.probe(Protocol::Socks),
        );

        let mut rule_string = String::new();
        for fragment in [http, https, ftp, socks] {
            rule_string.push_str(&fragment);
        }

        debug!(rules = %rule_string, "System proxy resolution complete");
        self.db
            .set_setting(SYSTEM_PROXY_RULES_KEY, &serde_json::json!(rule_string))?;

        let use_system: bool = self.db.get_setting_or(USE_SYSTEM_PROXY_KEY, false)?;
        if use_system {
            self.db
                .set_setting(PROXY_RULES_KEY, &serde_json::json!(rule_string))?;
        }

        Ok(())
    }

    /// Probes one protocol and normalizes the answer into a fragment.
    ///
    /// A lookup failure yields an empty fragment: a missing proxy entry
    /// degrades to a direct connection, not to a failed cycle.
    async fn probe(&self, protocol: Protocol) -> String {
        let url = probe_url(protocol);
        match self.lookup.resolve(&url).await {
            Ok(answer) => normalize_answer(protocol, &answer).unwrap_or_default(),
            Err(e) => {
                warn!(%protocol, error = %e, "Proxy lookup failed, treating as no proxy");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProxyError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Lookup with canned per-scheme answers; missing schemes error.
    struct FakeLookup {
        answers: HashMap<&'static str, &'static str>,
    }

    impl FakeLookup {
        fn new(answers: &[(&'static str, &'static str)]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
            }
        }
    }

    #[async_trait]
    impl ProxyLookup for FakeLookup {
        async fn resolve(&self, probe_url: &str) -> crate::error::Result<String> {
            let scheme = probe_url.split_once("://").unwrap().0;
            self.answers
                .get(scheme)
                .map(|answer| answer.to_string())
                .ok_or_else(|| ProxyError::Lookup(format!("no answer for {scheme}")))
        }
    }

    fn active_rules(db: &Database) -> String {
        db.get_setting_or(PROXY_RULES_KEY, String::new()).unwrap()
    }

    fn system_rules(db: &Database) -> String {
        db.get_setting_or(SYSTEM_PROXY_RULES_KEY, String::new())
            .unwrap()
    }

    #[tokio::test]
    async fn merges_fragments_in_protocol_order() {
        let db = Database::in_memory().unwrap();
        let lookup = FakeLookup::new(&[
            ("http", "PROXY proxy.corp:3128"),
            ("https", "HTTPS proxy.corp:3129"),
            ("ftp", "PROXY ftp-relay.corp:2121"),
            ("socks4", "SOCKS5 10.0.0.1:1080"),
        ]);

        SystemProxyResolver::new(db.clone(), lookup)
            .resolve_system_proxy()
            .await
            .unwrap();

        assert_eq!(
            system_rules(&db),
            "http=proxy.corp:3128;https=proxy.corp:3129;ftp=ftp-relay.corp:2121;socks=10.0.0.1:1080;"
        );
    }

    #[tokio::test]
    async fn direct_answers_contribute_nothing() {
        let db = Database::in_memory().unwrap();
        let lookup = FakeLookup::new(&[
            ("http", "DIRECT"),
            ("https", "DIRECT"),
            ("ftp", "DIRECT"),
            ("socks4", "DIRECT"),
        ]);

        SystemProxyResolver::new(db.clone(), lookup)
            .resolve_system_proxy()
            .await
            .unwrap();

        assert_eq!(system_rules(&db), "");
    }

    #[tokio::test]
    async fn failed_lookup_degrades_that_protocol_only() {
        let db = Database::in_memory().unwrap();
        // ftp is missing from the canned answers, so its lookup errors.
        let lookup = FakeLookup::new(&[
            ("http", "PROXY proxy.corp:3128"),
            ("https", "PROXY proxy.corp:3129"),
            ("socks4", "SOCKS4 10.0.0.1:1081"),
        ]);

        SystemProxyResolver::new(db.clone(), lookup)
            .resolve_system_proxy()
            .await
            .unwrap();

        let rules = system_rules(&db);
        assert_eq!(
            rules,
            "http=proxy.corp:3128;https=proxy.corp:3129;socks=10.0.0.1:1081;"
        );
        assert!(!rules.contains("ftp="));
    }

    #[tokio::test]
    async fn system_rules_stay_out_of_active_rules_by_default() {
        let db = Database::in_memory().unwrap();
        db.set_setting(PROXY_RULES_KEY, &serde_json::json!("http=manual.corp:8080;"))
            .unwrap();

        let lookup = FakeLookup::new(&[
            ("http", "PROXY detected.corp:3128"),
            ("https", "DIRECT"),
            ("ftp", "DIRECT"),
            ("socks4", "DIRECT"),
        ]);
        SystemProxyResolver::new(db.clone(), lookup)
            .resolve_system_proxy()
            .await
            .unwrap();

        assert_eq!(system_rules(&db), "http=detected.corp:3128;");
        // Manual configuration untouched while useSystemProxy is off.
        assert_eq!(active_rules(&db), "http=manual.corp:8080;");
    }

    #[tokio::test]
    async fn use_system_proxy_promotes_detected_rules() {
        let db = Database::in_memory().unwrap();
        db.set_setting(PROXY_RULES_KEY, &serde_json::json!("http=manual.corp:8080;"))
            .unwrap();
        db.set_setting(USE_SYSTEM_PROXY_KEY, &serde_json::json!(true))
            .unwrap();

        let lookup = FakeLookup::new(&[
            ("http", "PROXY detected.corp:3128"),
            ("https", "DIRECT"),
            ("ftp", "DIRECT"),
            ("socks4", "DIRECT"),
        ]);
        SystemProxyResolver::new(db.clone(), lookup)
            .resolve_system_proxy()
            .await
            .unwrap();

        assert_eq!(system_rules(&db), "http=detected.corp:3128;");
        assert_eq!(active_rules(&db), "http=detected.corp:3128;");
    }

    #[test]
    fn probe_urls_use_the_fixed_host() {
        assert_eq!(probe_url(Protocol::Http), "http://www.example.com");
        assert_eq!(probe_url(Protocol::Https), "https://www.example.com");
        assert_eq!(probe_url(Protocol::Ftp), "ftp://www.example.com");
        assert_eq!(probe_url(Protocol::Socks), "socks4://www.example.com");
    }
}
