//! Beacon Proxy - system proxy rule detection and per-request selection.
//!
//! This crate decides *which* upstream proxy (if any) each protocol should
//! use, and serializes that decision as a compact rule string persisted in
//! the settings store. It does not implement a proxy server, DNS resolution,
//! or TLS handling.
//!
//! ## Components
//!
//! - [`rules`]: the `proto=host:port;` rule string codec
//! - [`lookup`]: the host proxy-resolution seam ([`ProxyLookup`])
//! - [`normalize`]: raw platform answers to canonical rule fragments
//! - [`resolver`]: concurrent per-protocol detection and persistence
//! - [`selector`]: per-request rule selection against the active rule string
//!
//! ## Data flow
//!
//! ```text
//! ProxyLookup ──► normalize ──► SystemProxyResolver ──► settings store
//!                                                            │
//!                              request URI ──► RuleSelector ◄┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use beacon_proxy::{EnvProxyLookup, RuleSelector, SystemProxyResolver};
//! use beacon_storage::Database;
//!
//! # async fn run() -> beacon_proxy::Result<()> {
//! let db = Database::in_memory()?;
//!
//! // Detect and persist the host's proxy assignments.
//! let resolver = SystemProxyResolver::new(db.clone(), EnvProxyLookup::new());
//! resolver.resolve_system_proxy().await?;
//!
//! // Later, per outgoing request:
//! let selector = RuleSelector::new(db);
//! if let Some(rule) = selector.proxy_for("https://chat.example.com") {
//!     println!("proxy via {}", rule.endpoint());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
pub mod lookup;
pub mod normalize;
pub mod resolver;
pub mod rules;
pub mod selector;

pub use error::{ProxyError, Result};
pub use lookup::{EnvProxyLookup, ProxyLookup};
pub use normalize::normalize_answer;
pub use resolver::{
    SystemProxyResolver, PROXY_RULES_KEY, SYSTEM_PROXY_RULES_KEY, USE_SYSTEM_PROXY_KEY,
};
pub use rules::{decode_rule, Protocol, ProxyRule, RuleSet};
pub use selector::{select_rule, RuleSelector, Selection};
