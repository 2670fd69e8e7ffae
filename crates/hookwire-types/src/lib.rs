//! Hook configuration data model for Hookwire.
//!
//! This crate contains the serde-decodable types that describe hooks: which
//! rule tree gates a hook, where its command arguments come from, and what
//! the host should send back once the command ran.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror.

pub mod hook;

pub use hook::{
    Argument, ArgumentSource, CommandStatusResponse, ENV_NAMESPACE, Header, HeaderParseError,
    Hook, Hooks, MatchKind, MatchRule, ResponseHeaders, Rules,
};
