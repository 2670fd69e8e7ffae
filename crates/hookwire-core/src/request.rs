//! Per-request ownership bundle for the decoded request trees and raw body.

use serde_json::Value;

/// The decoded pieces of one incoming webhook request.
///
/// Built once by the inbound boundary and owned exclusively by that
/// request's evaluation. Rule evaluation borrows it immutably;
/// [`crate::hook::parse_json_parameters`] takes it `&mut` because JSON
/// splicing rewrites the trees in place. The borrow rules make sharing a
/// context across concurrent evaluations unrepresentable.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Request headers as a JSON object tree.
    pub headers: Value,
    /// Query parameters as a JSON object tree.
    pub query: Value,
    /// Decoded request payload tree.
    pub payload: Value,
    /// Raw request body bytes, exactly as received on the wire.
    pub body: Vec<u8>,
}

impl RequestContext {
    /// Bundle the decoded trees and raw body of one request.
    pub fn new(headers: Value, query: Value, payload: Value, body: Vec<u8>) -> Self {
        Self {
            headers,
            query,
            payload,
            body,
        }
    }
}
