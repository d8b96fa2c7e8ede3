//! Proxy rule string codec.
//!
//! Rule strings are the persisted textual form of per-protocol proxy
//! assignments: a sequence of `protocol=hostname:port` fragments, each
//! terminated by `;`. The empty string means "no proxy for any protocol".
//!
//! ```text
//! http=proxy.corp:3128;https=proxy.corp:3129;socks=10.0.0.1:1080;
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Protocols a rule string can carry, in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain HTTP requests.
    Http,
    /// HTTPS requests.
    Https,
    /// FTP requests.
    Ftp,
    /// SOCKS-tunneled traffic.
    Socks,
}

impl Protocol {
    /// All protocols, in the fixed serialization order.
    pub const ALL: [Protocol; 4] = [
        Protocol::Http,
        Protocol::Https,
        Protocol::Ftp,
        Protocol::Socks,
    ];

    /// The protocol token used in rule string fragments.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
            Protocol::Ftp => "ftp",
            Protocol::Socks => "socks",
        }
    }

    /// Maps a URI scheme to a selectable protocol.
    ///
    /// Only `http` and `https` are selectable per-request; ftp and socks
    /// fragments exist in system-detected rule strings but are never chosen
    /// for an outgoing request.
    pub fn from_request_scheme(scheme: &str) -> Option<Protocol> {
        match scheme {
            "http" => Some(Protocol::Http),
            "https" => Some(Protocol::Https),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One protocol's resolved proxy endpoint.
///
/// The hostname is always non-empty; "no proxy for this protocol" is
/// represented by the absence of a rule, never by an empty hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRule {
    /// Proxy hostname.
    pub hostname: String,
    /// Proxy port, when the fragment carried a parseable one.
    pub port: Option<u16>,
}

impl ProxyRule {
    /// Creates a rule, returning `None` for an empty hostname.
    pub fn new(hostname: impl Into<String>, port: Option<u16>) -> Option<ProxyRule> {
        let hostname = hostname.into();
        if hostname.is_empty() {
            return None;
        }
        Some(ProxyRule { hostname, port })
    }

    /// Renders the `hostname:port` endpoint of this rule.
    pub fn endpoint(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.hostname, port),
            None => self.hostname.clone(),
        }
    }
}

/// Mapping from protocol to proxy rule.
///
/// Absence of a protocol means "no proxy configured for that protocol".
/// Iteration (and therefore encoding) follows the fixed protocol order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: BTreeMap<Protocol, ProxyRule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> RuleSet {
        RuleSet::default()
    }

    /// Inserts a rule for a protocol, replacing any existing one.
    pub fn insert(&mut self, protocol: Protocol, rule: ProxyRule) {
        self.rules.insert(protocol, rule);
    }

    /// Returns the rule for a protocol, if any.
    pub fn get(&self, protocol: Protocol) -> Option<&ProxyRule> {
        self.rules.get(&protocol)
    }

    /// Returns true if no protocol has a rule.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Serializes the rule set into a rule string.
    ///
    /// Fragments appear in fixed protocol order; an empty set encodes to the
    /// empty string.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (protocol, rule) in &self.rules {
            out.push_str(&fragment(*protocol, &rule.endpoint()));
        }
        out
    }

    /// Parses every protocol's fragment out of a rule string.
    pub fn parse(rule_string: &str) -> RuleSet {
        let mut set = RuleSet::new();
        for protocol in Protocol::ALL {
            if let Some(rule) = decode_rule(rule_string, protocol) {
                set.insert(protocol, rule);
            }
        }
        set
    }
}

/// Builds one `protocol=endpoint;` fragment.
pub fn fragment(protocol: Protocol, endpoint: &str) -> String {
    format!("{}={};", protocol.as_str(), endpoint)
}

/// Extracts the rule for one protocol from a rule string.
///
/// Splits the string on `;`, keeps the fragment whose prefix is
/// `protocol=`, and reads the hostname as the text before the last `:`
/// with the port after it. Malformed fragments degrade to a best-effort
/// split (an unparseable port becomes `None`); this never errors.
pub fn decode_rule(rule_string: &str, protocol: Protocol) -> Option<ProxyRule> {
    if rule_string.is_empty() {
        return None;
    }

    let prefix_token = protocol.as_str();
    for raw_fragment in rule_string.split(';') {
        let trimmed = raw_fragment.trim();
        let Some(endpoint) = trimmed.strip_prefix(prefix_token) else {
            continue;
        };
        let Some(endpoint) = endpoint.strip_prefix('=') else {
            continue;
        };

        return decode_endpoint(endpoint.trim());
    }

    None
}

/// Splits an endpoint into hostname and port at the last `:`.
fn decode_endpoint(endpoint: &str) -> Option<ProxyRule> {
    match endpoint.rsplit_once(':') {
        Some((hostname, port)) => ProxyRule::new(hostname, port.trim().parse().ok()),
        None => ProxyRule::new(endpoint, None),
    }
}
