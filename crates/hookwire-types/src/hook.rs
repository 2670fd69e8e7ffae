//! Hook configuration types.
//!
//! A `Hook` pairs a trigger rule tree with argument-extraction declarations
//! for a single named webhook endpoint. Hooks are decoded once from an
//! ordered configuration document (JSON or YAML -- loading the file is the
//! host's job) and shared read-only across requests afterwards.
//!
//! All enumerations here are closed: an unknown `source` or match `type`
//! string, and a rule node with zero or more than one branch, are decode
//! errors rather than values that silently never match.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix prepended to argument names passed into the command environment.
pub const ENV_NAMESPACE: &str = "HOOK_";

// ---------------------------------------------------------------------------
// Argument
// ---------------------------------------------------------------------------

/// Where an argument value is taken from within an incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgumentSource {
    /// A value addressed by path inside the request headers tree.
    Header,
    /// A value addressed by path inside the query parameters tree.
    #[serde(rename = "url")]
    Query,
    /// A value addressed by path inside the decoded payload tree.
    Payload,
    /// The argument name itself, passed through verbatim.
    #[serde(rename = "string")]
    Literal,
    /// The whole payload tree serialized to JSON.
    EntirePayload,
    /// The whole query tree serialized to JSON.
    EntireQuery,
    /// The whole headers tree serialized to JSON.
    EntireHeaders,
}

impl fmt::Display for ArgumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::Query => "url",
            Self::Payload => "payload",
            Self::Literal => "string",
            Self::EntirePayload => "entire-payload",
            Self::EntireQuery => "entire-query",
            Self::EntireHeaders => "entire-headers",
        };
        f.write_str(name)
    }
}

/// A (source, name) pair resolved against an incoming request.
///
/// For the tree-backed sources `name` is a dot-delimited path
/// (e.g. `commits.0.author.email`); for `string` it is the literal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Which part of the request the value comes from.
    pub source: ArgumentSource,
    /// Path or literal, depending on `source`.
    pub name: String,
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.source, self.name)
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Leaf predicate kind for a [`MatchRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    /// Exact string equality against `value`.
    Value,
    /// Regular-expression match of `regex` against the resolved string.
    Regex,
    /// HMAC-SHA1 signature check of the raw body against `secret`.
    PayloadHashSha1,
    /// HMAC-SHA256 signature check of the raw body against `secret`.
    PayloadHashSha256,
    /// HMAC-SHA512 signature check of the raw body against `secret`.
    PayloadHashSha512,
}

/// A leaf rule comparing a resolved argument against a literal, a regular
/// expression, or a payload signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    /// Which comparison to perform.
    #[serde(rename = "type")]
    pub kind: MatchKind,
    /// The argument whose resolved value is compared.
    pub parameter: Argument,
    /// Expected value for `type: value`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// Pattern for `type: regex`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub regex: String,
    /// Shared secret for the `payload-hash-*` kinds.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,
}

/// A trigger rule tree.
///
/// Externally tagged, so a document node is a map with exactly one of the
/// four keys:
///
/// ```json
/// { "and": [ { "match": { "type": "value", ... } }, ... ] }
/// ```
///
/// serde rejects nodes carrying zero keys or more than one, which removes
/// the need for any branch-priority rule on malformed nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rules {
    /// True iff every child is true; empty evaluates to true.
    And(Vec<Rules>),
    /// True iff any child is true; empty evaluates to false.
    Or(Vec<Rules>),
    /// Negation of the single child.
    Not(Box<Rules>),
    /// Leaf predicate.
    Match(MatchRule),
}

// ---------------------------------------------------------------------------
// Response headers
// ---------------------------------------------------------------------------

/// A single response header name/value pair, rendered verbatim by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// Error parsing a `name=value` header assignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("header must be in name=value format: '{input}'")]
pub struct HeaderParseError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Header {
    type Err = HeaderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, value)) => Ok(Self {
                name: name.to_string(),
                value: value.to_string(),
            }),
            None => Err(HeaderParseError {
                input: s.to_string(),
            }),
        }
    }
}

/// Ordered list of response headers attached to a hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseHeaders(pub Vec<Header>);

impl ResponseHeaders {
    /// Parse a `name=value` assignment and append it.
    pub fn push_assignment(&mut self, assignment: &str) -> Result<(), HeaderParseError> {
        self.0.push(assignment.parse()?);
        Ok(())
    }

    /// True when no headers are configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the configured headers in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.0.iter()
    }
}

impl fmt::Display for ResponseHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|h| format!("{}={}", h.name, h.value))
            .collect();
        f.write_str(&rendered.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Hook
// ---------------------------------------------------------------------------

/// A named trigger pairing a rule tree with argument-extraction declarations.
///
/// Immutable once decoded; evaluation never mutates a `Hook`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Hook {
    /// Endpoint identifier the host routes requests by.
    pub id: String,
    /// Path of the command the host executes when the hook fires.
    pub execute_command: String,
    /// Working directory for the command (empty = host default).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command_working_directory: String,
    /// Fixed message the host returns to the caller.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response_message: String,
    /// Extra response headers, rendered verbatim by the host.
    #[serde(default, skip_serializing_if = "ResponseHeaders::is_empty")]
    pub response_headers: ResponseHeaders,
    /// Whether the host should include command output in its response.
    #[serde(default, rename = "include-command-output-in-response")]
    pub capture_command_output: bool,
    /// Arguments exported as `HOOK_<name>=<value>` environment entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pass_environment_to_command: Vec<Argument>,
    /// Arguments appended to the command line in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pass_arguments_to_command: Vec<Argument>,
    /// Arguments whose string values are decoded as JSON objects and
    /// spliced back into their source tree before extraction.
    #[serde(default, rename = "parse-parameters-as-json", skip_serializing_if = "Vec::is_empty")]
    pub json_string_parameters: Vec<Argument>,
    /// Rule tree gating the hook; absent means the hook always fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_rule: Option<Rules>,
}

/// An ordered collection of hooks as decoded from a configuration document.
///
/// Document order is the tie-break priority when several hooks share an ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hooks(pub Vec<Hook>);

impl Hooks {
    /// First hook with the given ID, in document order.
    pub fn match_id(&self, id: &str) -> Option<&Hook> {
        self.0.iter().find(|hook| hook.id == id)
    }

    /// All hooks with the given ID, in document order.
    pub fn match_all(&self, id: &str) -> Vec<&Hook> {
        self.0.iter().filter(|hook| hook.id == id).collect()
    }

    /// Number of configured hooks.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no hooks are configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over hooks in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Hook> {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Command status
// ---------------------------------------------------------------------------

/// Result the process launcher reports back after running a hook command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStatusResponse {
    /// Human-readable status message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Captured command output, when requested.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output: String,
    /// Error description, if the command failed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
