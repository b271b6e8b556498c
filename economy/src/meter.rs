use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rates::estimate_cost;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown provider: {0}")]
pub struct ParseProviderError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn all() -> &'static [Provider] {
        &[Provider::OpenAi, Provider::Gemini]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }
}

impl FromStr for Provider {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParseProviderError(s.to_string()))
    }
}

/// Usage figures as reported by a provider, before sanitization. Any field
/// may be missing or garbage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUsage {
    pub input_tokens: Option<f64>,
    pub output_tokens: Option<f64>,
    pub cost_estimate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub provider: Provider,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_estimate: f64,
    pub timestamp: u64,
}

/// Running tally of provider calls for the current session.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UsageMeter {
    entries: Vec<UsageEntry>,
    total_tokens: u64,
    total_usd: f64,
}

impl UsageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitizes raw provider figures and appends an entry. Token counts are
    /// clamped to zero and floored; a missing or invalid cost estimate is
    /// derived from the provider's rate table.
    pub fn record(&mut self, provider: Provider, raw: RawUsage) {
        let input_tokens = sanitize_tokens(raw.input_tokens);
        let output_tokens = sanitize_tokens(raw.output_tokens);
        let cost_estimate = match raw.cost_estimate {
            Some(cost) if cost.is_finite() && cost >= 0.0 => cost,
            _ => estimate_cost(provider, input_tokens, output_tokens),
        };

        self.total_tokens += input_tokens + output_tokens;
        self.total_usd += cost_estimate;
        self.entries.push(UsageEntry {
            provider,
            input_tokens,
            output_tokens,
            cost_estimate,
            timestamp: now(),
        });
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.total_tokens = 0;
        self.total_usd = 0.0;
    }

    pub fn entries(&self) -> &[UsageEntry] {
        &self.entries
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn total_usd(&self) -> f64 {
        self.total_usd
    }
}

fn sanitize_tokens(raw: Option<f64>) -> u64 {
    raw.unwrap_or(0.0).max(0.0).floor() as u64
}

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trip() {
        for provider in Provider::all().iter().copied() {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
        assert!("anthropic".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Provider::OpenAi).unwrap(),
            "\"openai\""
        );
        assert_eq!(
            serde_json::to_string(&Provider::Gemini).unwrap(),
            "\"gemini\""
        );
    }

    #[test]
    fn test_record_keeps_reported_cost() {
        let mut meter = UsageMeter::new();
        meter.record(
            Provider::OpenAi,
            RawUsage {
                input_tokens: Some(120.0),
                output_tokens: Some(80.0),
                cost_estimate: Some(0.01),
            },
        );

        let entry = &meter.entries()[0];
        assert_eq!(entry.input_tokens, 120);
        assert_eq!(entry.output_tokens, 80);
        assert!((entry.cost_estimate - 0.01).abs() < 1e-12);
        assert_eq!(meter.total_tokens(), 200);
    }

    #[test]
    fn test_record_derives_missing_cost_from_rates() {
        let mut meter = UsageMeter::new();
        meter.record(
            Provider::OpenAi,
            RawUsage {
                input_tokens: Some(1000.0),
                output_tokens: Some(500.0),
                cost_estimate: None,
            },
        );

        assert_eq!(meter.total_tokens(), 1500);
        assert!((meter.total_usd() - 0.0125).abs() < 1e-9);
    }

    #[test]
    fn test_record_sanitizes_garbage_figures() {
        let mut meter = UsageMeter::new();
        meter.record(
            Provider::OpenAi,
            RawUsage {
                input_tokens: Some(-42.0),
                output_tokens: Some(12.7),
                cost_estimate: Some(f64::NAN),
            },
        );

        let entry = &meter.entries()[0];
        assert_eq!(entry.input_tokens, 0);
        assert_eq!(entry.output_tokens, 12);
        assert!((entry.cost_estimate - estimate_cost(Provider::OpenAi, 0, 12)).abs() < 1e-12);
    }

    #[test]
    fn test_record_treats_nan_tokens_as_zero() {
        let mut meter = UsageMeter::new();
        meter.record(
            Provider::Gemini,
            RawUsage {
                input_tokens: Some(f64::NAN),
                output_tokens: None,
                cost_estimate: None,
            },
        );

        assert_eq!(meter.total_tokens(), 0);
        assert_eq!(meter.total_usd(), 0.0);
    }

    #[test]
    fn test_totals_match_entry_sums() {
        let mut meter = UsageMeter::new();
        meter.record(
            Provider::OpenAi,
            RawUsage {
                input_tokens: Some(100.0),
                output_tokens: Some(50.0),
                cost_estimate: Some(0.002),
            },
        );
        meter.record(
            Provider::Gemini,
            RawUsage {
                input_tokens: Some(300.0),
                output_tokens: Some(200.0),
                cost_estimate: None,
            },
        );

        let token_sum: u64 = meter
            .entries()
            .iter()
            .map(|e| e.input_tokens + e.output_tokens)
            .sum();
        let usd_sum: f64 = meter.entries().iter().map(|e| e.cost_estimate).sum();

        assert_eq!(meter.total_tokens(), token_sum);
        assert!((meter.total_usd() - usd_sum).abs() < 1e-9);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut meter = UsageMeter::new();
        meter.record(
            Provider::OpenAi,
            RawUsage {
                input_tokens: Some(10.0),
                output_tokens: Some(10.0),
                cost_estimate: Some(0.001),
            },
        );
        meter.reset();

        assert!(meter.entries().is_empty());
        assert_eq!(meter.total_tokens(), 0);
        assert_eq!(meter.total_usd(), 0.0);
    }
}
