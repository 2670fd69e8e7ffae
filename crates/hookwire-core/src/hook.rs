//! Hook firing decisions and command argument/environment extraction.
//!
//! Once a request passes its hook's trigger rule, the declared arguments
//! are resolved in order into the command line and environment for the
//! host's process launcher. Extraction stops at the first unresolvable
//! argument and hands back both the partial list and the failure, so the
//! host decides whether a half-built command line is usable.

use serde_json::Value;

use hookwire_types::{Argument, ArgumentSource, ENV_NAMESPACE, Hook};

use crate::parameter::{replace_parameter, resolve_argument};
use crate::request::RequestContext;
use crate::rules::{RulesError, evaluate};

/// Errors from JSON-parameter splicing.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// The declared argument could not be resolved to a string.
    #[error("couldn't retrieve argument for {0}")]
    Argument(Argument),

    /// The declared source is not a tree domain JSON can be spliced into.
    #[error("invalid source for argument {0}")]
    Source(Argument),

    /// The resolved string was not a valid JSON object.
    #[error("couldn't parse argument as JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure while building an argument or environment list.
///
/// Carries everything resolved before the failing entry; for command
/// arguments that includes a trailing empty-string placeholder in the
/// failing position.
#[derive(Debug, thiserror::Error)]
#[error("couldn't retrieve argument for {argument}")]
pub struct ExtractError {
    /// The argument that failed to resolve.
    pub argument: Argument,
    /// The list built up to the point of failure.
    pub partial: Vec<String>,
}

/// Decides whether a hook fires for the given request.
///
/// A hook without a trigger rule always fires.
pub fn should_trigger(hook: &Hook, request: &RequestContext) -> Result<bool, RulesError> {
    match &hook.trigger_rule {
        Some(rule) => {
            let fired = evaluate(rule, request)?;
            tracing::debug!(hook = %hook.id, fired, "evaluated trigger rule");
            Ok(fired)
        }
        None => Ok(true),
    }
}

/// Builds the command line: `[execute_command, arg1, arg2, ...]`.
///
/// Arguments are resolved in declaration order. On the first unresolvable
/// argument an empty-string placeholder is appended, extraction stops, and
/// the partial list is returned inside the error.
pub fn extract_command_arguments(
    hook: &Hook,
    request: &RequestContext,
) -> Result<Vec<String>, ExtractError> {
    let mut args = vec![hook.execute_command.clone()];

    for argument in &hook.pass_arguments_to_command {
        match resolve_argument(argument, request) {
            Some(value) => args.push(value),
            None => {
                args.push(String::new());
                return Err(ExtractError {
                    argument: argument.clone(),
                    partial: args,
                });
            }
        }
    }

    Ok(args)
}

/// Builds `HOOK_<name>=<value>` environment entries in declaration order.
///
/// Stops at the first unresolvable argument and returns the partial list
/// inside the error; unlike the command line, no placeholder is added for
/// the failing entry.
pub fn extract_command_arguments_for_env(
    hook: &Hook,
    request: &RequestContext,
) -> Result<Vec<String>, ExtractError> {
    let mut env = Vec::new();

    for argument in &hook.pass_environment_to_command {
        match resolve_argument(argument, request) {
            Some(value) => env.push(format!("{ENV_NAMESPACE}{}={}", argument.name, value)),
            None => {
                return Err(ExtractError {
                    argument: argument.clone(),
                    partial: env,
                });
            }
        }
    }

    Ok(env)
}

/// Decodes declared string parameters as JSON objects and splices them back
/// into their source tree, in place.
///
/// Numbers keep their exact source text through the decode. A splice whose
/// target key does not already exist is refused by `replace_parameter` and
/// logged, not treated as an error.
pub fn parse_json_parameters(hook: &Hook, request: &mut RequestContext) -> Result<(), HookError> {
    for argument in &hook.json_string_parameters {
        let Some(raw) = resolve_argument(argument, request) else {
            return Err(HookError::Argument(argument.clone()));
        };

        let decoded: serde_json::Map<String, Value> = serde_json::from_str(&raw)?;

        let tree = match argument.source {
            ArgumentSource::Header => &mut request.headers,
            ArgumentSource::Query => &mut request.query,
            ArgumentSource::Payload => &mut request.payload,
            _ => return Err(HookError::Source(argument.clone())),
        };

        if !replace_parameter(&argument.name, tree, Value::Object(decoded)) {
            tracing::warn!(parameter = %argument, "json parameter splice refused, key not present");
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hookwire_types::{MatchKind, MatchRule, Rules};
    use serde_json::json;

    use crate::parameter::get_parameter;
    use crate::signature::check_payload_signature;

    fn argument(source: ArgumentSource, name: &str) -> Argument {
        Argument {
            source,
            name: name.to_string(),
        }
    }

    fn base_hook() -> Hook {
        serde_json::from_str(r#"{ "id": "deploy", "execute-command": "/opt/deploy.sh" }"#)
            .unwrap()
    }

    fn sample_request() -> RequestContext {
        RequestContext::new(
            json!({ "X-Request-Id": "abc123" }),
            json!({ "force": "yes" }),
            json!({
                "ref": "refs/heads/main",
                "head_commit": { "id": "b6a0c1" },
                "inner": "{\"state\":\"ok\",\"count\":123456789012345678901234567890}"
            }),
            b"raw-body".to_vec(),
        )
    }

    // -------------------------------------------------------------------
    // should_trigger
    // -------------------------------------------------------------------

    #[test]
    fn test_hook_without_rule_always_fires() {
        let hook = base_hook();
        assert!(should_trigger(&hook, &sample_request()).unwrap());
    }

    #[test]
    fn test_hook_fires_only_when_rule_matches() {
        let mut hook = base_hook();
        hook.trigger_rule = Some(Rules::Match(MatchRule {
            kind: MatchKind::Value,
            parameter: argument(ArgumentSource::Payload, "ref"),
            value: "refs/heads/main".to_string(),
            regex: String::new(),
            secret: String::new(),
        }));

        assert!(should_trigger(&hook, &sample_request()).unwrap());

        let mut request = sample_request();
        request.payload["ref"] = json!("refs/heads/dev");
        assert!(!should_trigger(&hook, &request).unwrap());
    }

    #[test]
    fn test_signature_gated_hook_end_to_end() {
        let secret = "s3cr3t";
        let request = sample_request();
        let computed = check_payload_signature(&request.body, secret, "")
            .unwrap_err()
            .computed;

        let mut hook = base_hook();
        hook.trigger_rule = Some(Rules::And(vec![
            Rules::Match(MatchRule {
                kind: MatchKind::PayloadHashSha1,
                parameter: argument(ArgumentSource::Header, "X-Hub-Signature"),
                value: String::new(),
                regex: String::new(),
                secret: secret.to_string(),
            }),
            Rules::Match(MatchRule {
                kind: MatchKind::Value,
                parameter: argument(ArgumentSource::Payload, "ref"),
                value: "refs/heads/main".to_string(),
                regex: String::new(),
                secret: String::new(),
            }),
        ]));

        let mut signed = sample_request();
        signed.headers["X-Hub-Signature"] = json!(format!("sha1={computed}"));
        assert!(should_trigger(&hook, &signed).unwrap());

        let mut tampered = signed.clone();
        tampered.body = b"tampered-body".to_vec();
        assert!(should_trigger(&hook, &tampered).is_err());
    }

    // -------------------------------------------------------------------
    // extract_command_arguments
    // -------------------------------------------------------------------

    #[test]
    fn test_command_line_starts_with_executable() {
        let hook = base_hook();
        let args = extract_command_arguments(&hook, &sample_request()).unwrap();
        assert_eq!(args, vec!["/opt/deploy.sh".to_string()]);
    }

    #[test]
    fn test_command_arguments_resolve_in_order() {
        let mut hook = base_hook();
        hook.pass_arguments_to_command = vec![
            argument(ArgumentSource::Payload, "head_commit.id"),
            argument(ArgumentSource::Literal, "production"),
            argument(ArgumentSource::Query, "force"),
        ];

        let args = extract_command_arguments(&hook, &sample_request()).unwrap();
        assert_eq!(args, vec!["/opt/deploy.sh", "b6a0c1", "production", "yes"]);
    }

    #[test]
    fn test_command_arguments_stop_with_placeholder() {
        let mut hook = base_hook();
        hook.pass_arguments_to_command = vec![
            argument(ArgumentSource::Payload, "ref"),
            argument(ArgumentSource::Payload, "missing.path"),
            argument(ArgumentSource::Literal, "never-reached"),
        ];

        let err = extract_command_arguments(&hook, &sample_request()).unwrap_err();
        assert_eq!(err.argument.name, "missing.path");
        // Executable, first argument, then the empty placeholder; the
        // third declaration is never resolved.
        assert_eq!(err.partial, vec!["/opt/deploy.sh", "refs/heads/main", ""]);
    }

    // -------------------------------------------------------------------
    // extract_command_arguments_for_env
    // -------------------------------------------------------------------

    #[test]
    fn test_env_entries_carry_namespace_prefix() {
        let mut hook = base_hook();
        hook.pass_environment_to_command = vec![
            argument(ArgumentSource::Header, "X-Request-Id"),
            argument(ArgumentSource::Payload, "ref"),
        ];

        let env = extract_command_arguments_for_env(&hook, &sample_request()).unwrap();
        assert_eq!(
            env,
            vec![
                "HOOK_X-Request-Id=abc123".to_string(),
                "HOOK_ref=refs/heads/main".to_string(),
            ]
        );
    }

    #[test]
    fn test_env_extraction_stops_without_placeholder() {
        let mut hook = base_hook();
        hook.pass_environment_to_command = vec![
            argument(ArgumentSource::Header, "X-Request-Id"),
            argument(ArgumentSource::Header, "X-Missing"),
        ];

        let err = extract_command_arguments_for_env(&hook, &sample_request()).unwrap_err();
        assert_eq!(err.argument.name, "X-Missing");
        assert_eq!(err.partial, vec!["HOOK_X-Request-Id=abc123".to_string()]);
    }

    #[test]
    fn test_env_extraction_empty_declaration_is_empty_list() {
        let hook = base_hook();
        let env = extract_command_arguments_for_env(&hook, &sample_request()).unwrap();
        assert!(env.is_empty());
    }

    // -------------------------------------------------------------------
    // parse_json_parameters
    // -------------------------------------------------------------------

    #[test]
    fn test_json_parameter_splices_into_payload() {
        let mut hook = base_hook();
        hook.json_string_parameters = vec![argument(ArgumentSource::Payload, "inner")];

        let mut request = sample_request();
        parse_json_parameters(&hook, &mut request).unwrap();

        assert_eq!(
            get_parameter("inner.state", &request.payload),
            Some(&json!("ok"))
        );
        // The decoded number keeps its exact source text.
        assert_eq!(
            get_parameter("inner.count", &request.payload).unwrap().to_string(),
            "123456789012345678901234567890"
        );
    }

    #[test]
    fn test_json_parameter_malformed_json_is_parse_error() {
        let mut hook = base_hook();
        hook.json_string_parameters = vec![argument(ArgumentSource::Payload, "ref")];

        let mut request = sample_request();
        let err = parse_json_parameters(&hook, &mut request).unwrap_err();
        assert!(matches!(err, HookError::Parse(_)));
    }

    #[test]
    fn test_json_parameter_unresolvable_is_argument_error() {
        let mut hook = base_hook();
        hook.json_string_parameters = vec![argument(ArgumentSource::Payload, "absent")];

        let mut request = sample_request();
        let err = parse_json_parameters(&hook, &mut request).unwrap_err();
        assert!(matches!(err, HookError::Argument(_)));
    }

    #[test]
    fn test_json_parameter_literal_source_is_source_error() {
        let mut hook = base_hook();
        hook.json_string_parameters =
            vec![argument(ArgumentSource::Literal, r#"{"state":"ok"}"#)];

        let mut request = sample_request();
        let err = parse_json_parameters(&hook, &mut request).unwrap_err();
        assert!(matches!(err, HookError::Source(_)));
    }

    #[test]
    fn test_json_parameter_then_extraction_sees_spliced_tree() {
        let mut hook = base_hook();
        hook.json_string_parameters = vec![argument(ArgumentSource::Payload, "inner")];
        hook.pass_arguments_to_command = vec![argument(ArgumentSource::Payload, "inner.state")];

        let mut request = sample_request();
        parse_json_parameters(&hook, &mut request).unwrap();
        let args = extract_command_arguments(&hook, &request).unwrap();
        assert_eq!(args, vec!["/opt/deploy.sh", "ok"]);
    }
}
