use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::info;

use super::SharedState;
use crate::engine::{
    ContradictionRequest, CrossCaseRequest, ReasoningRequest, ReasoningType, VerificationRequest,
};
use crate::error::{RpcError, RpcResult};

/// Capabilities reported by the `info` tool.
pub const CAPABILITIES: &[&str] = &[
    "hierarchical_reasoning",
    "hypothesis_verification",
    "contradiction_detection",
    "cross_case_analysis",
];

/// Route tool calls to appropriate handlers
pub async fn handle_tool_call(
    state: &SharedState,
    tool_name: &str,
    arguments: Option<Value>,
) -> RpcResult<Value> {
    info!(tool = %tool_name, "Routing tool call");
    let start = Instant::now();

    let result = match tool_name {
        "reason" => handle_reason(state, arguments).await,
        "verify_hypothesis" => handle_verify_hypothesis(state, arguments).await,
        "find_contradictions" => handle_find_contradictions(state, arguments).await,
        "cross_case_reasoning" => handle_cross_case(state, arguments).await,
        "health" => handle_health(state).await,
        "info" => handle_info(state),
        _ => Err(RpcError::UnknownTool {
            tool_name: tool_name.to_string(),
        }),
    };

    info!(
        tool = %tool_name,
        success = result.is_ok(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Tool call finished"
    );
    result
}

// ============================================================================
// Reasoning Handlers
// ============================================================================

async fn handle_reason(state: &SharedState, arguments: Option<Value>) -> RpcResult<Value> {
    let depth_supplied = arguments
        .as_ref()
        .and_then(|args| args.get("max_depth"))
        .is_some();
    let mut request: ReasoningRequest = parse_arguments("reason", arguments)?;

    let ceiling = state.engine.max_depth_ceiling();
    if !depth_supplied {
        request.max_depth = state.config.engine.default_max_depth;
    } else if !(1..=ceiling).contains(&request.max_depth) {
        return Err(RpcError::InvalidParameters {
            tool_name: "reason".to_string(),
            message: format!("max_depth must be between 1 and {}", ceiling),
        });
    }

    to_value(state.engine.reason(request).await)
}

async fn handle_verify_hypothesis(
    state: &SharedState,
    arguments: Option<Value>,
) -> RpcResult<Value> {
    let request: VerificationRequest = parse_arguments("verify_hypothesis", arguments)?;
    to_value(state.engine.verify_hypothesis(request).await)
}

async fn handle_find_contradictions(
    state: &SharedState,
    arguments: Option<Value>,
) -> RpcResult<Value> {
    let request: ContradictionRequest = parse_arguments("find_contradictions", arguments)?;
    to_value(state.engine.find_contradictions(request).await)
}

async fn handle_cross_case(state: &SharedState, arguments: Option<Value>) -> RpcResult<Value> {
    let request: CrossCaseRequest = parse_arguments("cross_case_reasoning", arguments)?;
    to_value(state.engine.cross_case_reasoning(request).await)
}

// ============================================================================
// Service Handlers
// ============================================================================

async fn handle_health(state: &SharedState) -> RpcResult<Value> {
    let engine = &state.engine;
    let available = engine.is_available().await;

    Ok(json!({
        "status": if available { "healthy" } else { "degraded" },
        "engine_ready": true,
        "strategy": engine.strategy_kind(),
        "llm_available": available,
        "cache_enabled": engine.cache().is_enabled(),
        "cache_entries": engine.cache().len().await,
    }))
}

fn handle_info(state: &SharedState) -> RpcResult<Value> {
    Ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "strategy": state.engine.strategy_kind(),
        "capabilities": CAPABILITIES,
        "reasoning_types": ReasoningType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        "max_depth_ceiling": state.engine.max_depth_ceiling(),
    }))
}

// ============================================================================
// Helper functions
// ============================================================================

/// Helper to parse arguments with consistent error handling
fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool_name: &str,
    arguments: Option<Value>,
) -> RpcResult<T> {
    match arguments {
        Some(args) => serde_json::from_value(args).map_err(|e| RpcError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: e.to_string(),
        }),
        None => Err(RpcError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: "Missing arguments".to_string(),
        }),
    }
}

fn to_value<R: Serialize>(result: R) -> RpcResult<Value> {
    serde_json::to_value(result).map_err(RpcError::Json)
}
