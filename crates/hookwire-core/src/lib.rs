//! Trigger-rule evaluation and argument extraction for Hookwire.
//!
//! This crate is the engine behind a webhook endpoint: given the decoded
//! pieces of one request (header, query and payload trees plus the raw body
//! bytes) it decides whether a configured hook should fire and resolves the
//! command-line arguments and environment entries for the host's process
//! launcher.
//!
//! - `parameter` -- dot-path resolver over nested request data
//! - `signature` -- HMAC payload-signature verification
//! - `rules` -- recursive and/or/not/match rule evaluation
//! - `hook` -- command argument, environment and JSON-parameter extraction
//! - `request` -- per-request ownership bundle for the three trees + body
//!
//! Everything here is synchronous and free of I/O; hosts fan requests out
//! however they like, holding hook configuration behind a shared reference
//! and giving each request its own [`request::RequestContext`].

pub mod hook;
pub mod parameter;
pub mod request;
pub mod rules;
pub mod signature;

pub use hook::{
    ExtractError, HookError, extract_command_arguments, extract_command_arguments_for_env,
    parse_json_parameters, should_trigger,
};
pub use parameter::{
    extract_parameter_as_string, get_parameter, replace_parameter, resolve_argument,
};
pub use request::RequestContext;
pub use rules::{RulesError, evaluate};
pub use signature::{
    SignatureError, check_payload_signature, check_payload_signature256,
    check_payload_signature512,
};
