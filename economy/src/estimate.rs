use tiktoken_rs::cl100k_base;

use crate::meter::RawUsage;

/// Local token estimator for provider calls that come back without usage
/// figures.
pub struct TokenEstimator {
    bpe: tiktoken_rs::CoreBPE,
}

impl TokenEstimator {
    pub fn new() -> Self {
        Self {
            bpe: cl100k_base().expect("Failed to initialize tiktoken"),
        }
    }

    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// Builds raw usage from local token counts. The cost is left unset so
    /// the meter derives it from the provider's rate table.
    pub fn estimate_usage(&self, prompt: &str, reply: &str) -> RawUsage {
        RawUsage {
            input_tokens: Some(self.count(prompt) as f64),
            output_tokens: Some(self.count(reply) as f64),
            cost_estimate: None,
        }
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}
