//! Per-request proxy rule selection.
//!
//! Given an outgoing request URI and the active rule string, picks the single
//! applicable proxy rule. An explicitly empty active rule set means "force
//! direct connections": the transport is told to ignore any proxy settings it
//! would otherwise pick up from the environment.

use tracing::warn;
use url::Url;

use beacon_storage::Database;

use crate::resolver::PROXY_RULES_KEY;
use crate::rules::{decode_rule, Protocol, ProxyRule};

/// Outcome of selecting a rule for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Route the request through this proxy.
    Rule(ProxyRule),

    /// The active rule set is explicitly empty: connect direct and ignore
    /// ambient proxy configuration.
    ForceDirect,

    /// No rule applies; proceed without a proxy.
    NoRule,
}

/// Selects the applicable rule for a request URI against an active rule
/// string.
///
/// Never performs I/O and never fails: malformed URIs, non-selectable
/// schemes, and absent fragments all degrade to [`Selection::NoRule`].
pub fn select_rule(uri: &str, active_rules: &str) -> Selection {
    let Ok(parsed) = Url::parse(uri) else {
        return Selection::NoRule;
    };

    if active_rules.is_empty() {
        return Selection::ForceDirect;
    }

    let Some(protocol) = Protocol::from_request_scheme(parsed.scheme()) else {
        return Selection::NoRule;
    };

    match decode_rule(active_rules, protocol) {
        Some(rule) => Selection::Rule(rule),
        None => Selection::NoRule,
    }
}

/// Request-time rule selector reading the active rule string from settings.
#[derive(Clone)]
pub struct RuleSelector {
    db: Database,
}

impl RuleSelector {
    /// Creates a selector over the settings database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns the proxy rule to use for a request URI, or `None` for a
    /// direct connection.
    ///
    /// Reads the active rule string (default empty); a store read failure
    /// degrades to the empty rule set with a warning, so proxy
    /// misconfiguration never blocks a request. When the active rule set is
    /// explicitly empty, the `NO_PROXY=*` override is set so the transport
    /// ignores environment-supplied proxies entirely.
    pub fn proxy_for(&self, uri: &str) -> Option<ProxyRule> {
        let active_rules = match self.db.get_setting_or(PROXY_RULES_KEY, String::new()) {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "Failed to read active proxy rules, assuming none");
                String::new()
            }
        };

        match select_rule(uri, &active_rules) {
            Selection::Rule(rule) => Some(rule),
            Selection::ForceDirect => {
                std::env::set_var("NO_PROXY", "*");
                None
            }
            Selection::NoRule => None,
        }
    }
}
