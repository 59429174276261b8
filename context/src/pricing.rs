//! Per-model input token pricing.
//!
//! [`PricingTable`] resolves a model name to a [`ModelPricing`] by prefix
//! match, falling back to a conservative default for unknown models. The
//! fallback is explicit in the returned [`PricingSource`] so callers can flag
//! estimates that are guesses.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// USD per one million input tokens.
    input_per_million: f64,
}

impl ModelPricing {
    #[must_use]
    pub const fn new(input_per_million: f64) -> Self {
        Self { input_per_million }
    }

    /// Cost in USD of sending `tokens` input tokens.
    #[must_use]
    pub fn input_cost(self, tokens: u32) -> f64 {
        f64::from(tokens) * self.input_per_million / 1_000_000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingSource {
    /// Matched a known prefix (the matched prefix).
    Prefix(&'static str),
    /// No prefix matched; [`DEFAULT_PRICING`] was used.
    DefaultFallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPricing {
    pub pricing: ModelPricing,
    pub source: PricingSource,
}

const DEFAULT_PRICING: ModelPricing = ModelPricing::new(2.50);

/// Ordered by specificity: more specific prefixes first.
const KNOWN_MODELS: &[(&str, ModelPricing)] = &[
    ("gpt-4o-mini", ModelPricing::new(0.15)),
    ("gpt-4o", ModelPricing::new(2.50)),
    ("gpt-4.1-nano", ModelPricing::new(0.10)),
    ("gpt-4.1-mini", ModelPricing::new(0.40)),
    ("gpt-4.1", ModelPricing::new(2.00)),
    ("gpt-4-turbo", ModelPricing::new(10.00)),
    ("gpt-4", ModelPricing::new(30.00)),
    ("gpt-3.5-turbo", ModelPricing::new(0.50)),
    ("gpt-5-mini", ModelPricing::new(0.25)),
    ("gpt-5-nano", ModelPricing::new(0.05)),
    ("gpt-5", ModelPricing::new(1.25)),
    ("o3-mini", ModelPricing::new(1.10)),
    ("o3", ModelPricing::new(2.00)),
    ("o1", ModelPricing::new(15.00)),
    ("claude-opus-4", ModelPricing::new(15.00)),
    ("claude-sonnet-4", ModelPricing::new(3.00)),
    ("claude-3-5-haiku", ModelPricing::new(0.80)),
    ("claude-haiku-4", ModelPricing::new(1.00)),
    ("gemini-2.5-pro", ModelPricing::new(1.25)),
    ("gemini-2.5-flash", ModelPricing::new(0.30)),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PricingTable;

impl PricingTable {
    #[must_use]
    pub fn get(&self, model: &str) -> ResolvedPricing {
        // Provider-qualified names like "openai/gpt-4o" price like the bare model.
        let bare = model.rsplit('/').next().unwrap_or(model);
        for (prefix, pricing) in KNOWN_MODELS {
            if bare.starts_with(prefix) {
                return ResolvedPricing {
                    pricing: *pricing,
                    source: PricingSource::Prefix(prefix),
                };
            }
        }
        ResolvedPricing {
            pricing: DEFAULT_PRICING,
            source: PricingSource::DefaultFallback,
        }
    }
}
