//! Conversation history and its supporting services.
//!
//! This crate provides:
//! - The in-memory [`History`] store and its mutation primitives
//! - JSON save/load of a history through crash-safe file writes
//! - Approximate token counting via tiktoken
//! - Per-model pricing and the [`TokenEstimator`] seam used by `%tokens`
//!
//! # Architecture
//!
//! ```text
//! History (Vec<Message>, oldest first)
//! ├── persist: save_history / load_history (JSON, 2-space indent)
//! │   └── atomic_write (temp file + rename)
//! └── TokenEstimator
//!     └── TiktokenEstimator
//!         ├── counter: TokenCounter (tiktoken o200k_base)
//!         └── pricing: PricingTable (prefix match)
//! ```

mod atomic_write;
mod estimator;
mod history;
mod persist;
mod pricing;
mod token_counter;

pub use atomic_write::atomic_write;
pub use estimator::{Estimate, EstimateError, TiktokenEstimator, TokenEstimator};
pub use history::History;
pub use persist::{
    DEFAULT_HISTORY_FILE, PersistError, display_path, load_history, resolve_history_path,
    save_history, to_json,
};
pub use pricing::{ModelPricing, PricingSource, PricingTable, ResolvedPricing};
pub use token_counter::TokenCounter;
