use crate::meter::Provider;

/// USD per 1000 tokens, input and output priced separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderRates {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

pub fn rates(provider: Provider) -> ProviderRates {
    match provider {
        Provider::OpenAi => ProviderRates {
            input_per_1k: 0.005,
            output_per_1k: 0.015,
        },
        Provider::Gemini => ProviderRates {
            input_per_1k: 0.00125,
            output_per_1k: 0.005,
        },
    }
}

/// Derives a cost estimate from the rate table when a metered call did not
/// report one itself.
pub fn estimate_cost(provider: Provider, input_tokens: u64, output_tokens: u64) -> f64 {
    let rates = rates(provider);
    (input_tokens as f64 / 1000.0) * rates.input_per_1k
        + (output_tokens as f64 / 1000.0) * rates.output_per_1k
}
