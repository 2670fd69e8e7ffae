//! Recursive trigger-rule evaluation.
//!
//! `evaluate` walks a [`Rules`] tree against one request. Evaluation is
//! strict about the difference between "did not match" (`Ok(false)`) and
//! "could not be decided" (`Err(..)`): a failed signature check or an
//! invalid regex surfaces as an error, never as a silent non-match, so a
//! host cannot confuse a broken security check with an ordinary miss.

use regex::Regex;

use hookwire_types::{MatchKind, MatchRule, Rules};

use crate::parameter::resolve_argument;
use crate::request::RequestContext;
use crate::signature::{
    SignatureError, check_payload_signature, check_payload_signature256,
    check_payload_signature512,
};

/// Errors that can occur while evaluating a rule tree.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// A match rule's regex pattern failed to compile.
    #[error("invalid match regex: {0}")]
    Regex(#[from] regex::Error),

    /// A payload signature check failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Evaluates a rule tree against one request.
///
/// `and` is true over an empty list and short-circuits on the first false
/// child; `or` is false over an empty list and short-circuits on the first
/// true child; both stop at the first erroring child. `not` negates its
/// child's boolean and passes an error through unmodified.
pub fn evaluate(rules: &Rules, request: &RequestContext) -> Result<bool, RulesError> {
    match rules {
        Rules::And(children) => {
            for child in children {
                if !evaluate(child, request)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Rules::Or(children) => {
            for child in children {
                if evaluate(child, request)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Rules::Not(child) => Ok(!evaluate(child, request)?),
        Rules::Match(rule) => evaluate_match(rule, request),
    }
}

/// Evaluates a leaf match rule.
///
/// An unresolvable parameter is a soft failure: the rule is false, not an
/// error.
fn evaluate_match(rule: &MatchRule, request: &RequestContext) -> Result<bool, RulesError> {
    let Some(resolved) = resolve_argument(&rule.parameter, request) else {
        tracing::debug!(parameter = %rule.parameter, "match parameter not found in request");
        return Ok(false);
    };

    match rule.kind {
        MatchKind::Value => Ok(resolved == rule.value),
        MatchKind::Regex => {
            // Patterns are recompiled on every evaluation; there is no
            // cross-request cache.
            let pattern = Regex::new(&rule.regex)?;
            Ok(pattern.is_match(&resolved))
        }
        MatchKind::PayloadHashSha1 => {
            check_payload_signature(&request.body, &rule.secret, &resolved)?;
            Ok(true)
        }
        MatchKind::PayloadHashSha256 => {
            check_payload_signature256(&request.body, &rule.secret, &resolved)?;
            Ok(true)
        }
        MatchKind::PayloadHashSha512 => {
            check_payload_signature512(&request.body, &rule.secret, &resolved)?;
            Ok(true)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
