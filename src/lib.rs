//! # HRM Reasoning
//!
//! A hierarchical reasoning engine for forensic investigation. A question,
//! a case context and a list of evidence items go in; a structured
//! conclusion with a traceable chain of intermediate inferences comes out.
//!
//! ## Features
//!
//! - **Hierarchical Reasoning**: plan → execute → synthesize, bounded by `max_depth`
//! - **Hypothesis Verification**: keyword-overlap scoring with strict and standard modes
//! - **Contradiction Detection**: antonym and absence checks across statements and evidence
//! - **Cross-Case Analysis**: feature-bag matching between case files
//! - **Two Strategies**: deterministic rule-based, or LLM-hybrid over a completion service
//! - **Bounded Cache**: LRU memoization of reasoning results keyed by content hash
//!
//! ## Architecture
//!
//! ```text
//! JSON-RPC client → RpcServer (stdio) → HierarchicalEngine → ReasoningStrategy
//!                                              ↓                    ↓
//!                                       ReasoningCache    CompletionClient (HTTP)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hrm_reasoning::engine::{Evidence, HierarchicalEngine, ReasoningCache, ReasoningRequest};
//! use hrm_reasoning::strategies::RuleBasedStrategy;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = HierarchicalEngine::new(
//!         Arc::new(RuleBasedStrategy::default()),
//!         Arc::new(ReasoningCache::default()),
//!         10,
//!     );
//!     let request = ReasoningRequest::new("Cambriolage", "Qui est responsable ?")
//!         .with_evidence(vec![Evidence::new("e1", "témoignage", "Le suspect Martin a fui")]);
//!     let result = engine.reason(request).await;
//!     println!("{}", result.conclusion);
//! }
//! ```

/// Configuration loaded from environment variables.
pub mod config;
/// Reasoning engine, data model and result cache.
pub mod engine;
/// Error types and result aliases for the application.
pub mod error;
/// Completion service client.
pub mod llm;
/// Regex feature extraction and the shared keyword lexicon.
pub mod patterns;
/// Structured-JSON prompts for the LLM-hybrid strategy.
pub mod prompts;
/// JSON-RPC server and tool handlers.
pub mod server;
/// Rule-based and LLM-hybrid reasoning strategies.
pub mod strategies;

pub use config::Config;
pub use engine::HierarchicalEngine;
pub use error::{AppError, AppResult};
pub use server::{AppState, RpcServer, SharedState};
