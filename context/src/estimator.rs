//! Token and cost estimation for a prospective request.

use parlor_types::Message;
use thiserror::Error;

use crate::pricing::{PricingSource, PricingTable};
use crate::token_counter::TokenCounter;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub tokens: u32,
    /// Estimated input cost in USD.
    pub cost: f64,
}

impl Estimate {
    #[must_use]
    pub fn combined(self, other: Estimate) -> Estimate {
        Estimate {
            tokens: self.tokens.saturating_add(other.tokens),
            cost: self.cost + other.cost,
        }
    }
}

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("tokenizer unavailable")]
    TokenizerUnavailable,
}

/// Produces `(token_count, cost)` for a list of messages sent to `model`.
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, messages: &[Message], model: &str) -> Result<Estimate, EstimateError>;
}

/// The default estimator: tiktoken counts priced from [`PricingTable`].
#[derive(Debug, Clone, Copy)]
pub struct TiktokenEstimator {
    counter: TokenCounter,
    pricing: PricingTable,
}

impl TiktokenEstimator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: TokenCounter::new(),
            pricing: PricingTable,
        }
    }
}

impl Default for TiktokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEstimator for TiktokenEstimator {
    fn estimate(&self, messages: &[Message], model: &str) -> Result<Estimate, EstimateError> {
        if !self.counter.is_exact() {
            return Err(EstimateError::TokenizerUnavailable);
        }
        let resolved = self.pricing.get(model);
        if resolved.source == PricingSource::DefaultFallback {
            tracing::debug!(model, "No pricing entry for model; using fallback rate");
        }

        let tokens = self.counter.count_messages(messages);
        Ok(Estimate {
            tokens,
            cost: resolved.pricing.input_cost(tokens),
        })
    }
}
