use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use economy::{
    estimate_cost, ActionKind, BalanceStore, CreditLedger, MemoryStore, Provider, TokenEstimator,
    BALANCE_KEY, STARTING_BALANCE,
};
use gateway::{Lead, LeadValidation};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bp-core")]
#[command(about = "BizPilot core CLI - credit charging, cost estimation, lead validation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the action price table
    Prices,
    /// Charge credits for an action against a persisted balance
    Charge {
        /// Action to charge (briefing.basic, analysis.deep, google_ads.briefing, file.upload.parse, chat.message)
        action: String,
        /// Path to the balance state file
        #[arg(long, default_value = ".bizpilot/credits.json")]
        state: PathBuf,
    },
    /// Estimate token count and provider cost for text (from file or stdin)
    Estimate {
        /// Path to file, or "-" for stdin (default: stdin)
        #[arg(default_value = "-")]
        source: String,
        /// Provider to price against (openai, gemini)
        #[arg(long, default_value = "openai")]
        provider: String,
    },
    /// Validate a lead JSON file
    ValidateLead {
        /// Path to the lead JSON file
        file: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct PricesResult {
    starting_balance: u64,
    actions: Vec<PriceEntry>,
}

#[derive(Debug, Serialize)]
struct PriceEntry {
    action: String,
    price: u64,
}

#[derive(Debug, Serialize)]
struct ChargeResult {
    action: String,
    price: u64,
    charged: bool,
    balance: u64,
}

#[derive(Debug, Serialize)]
struct EstimateResult {
    provider: String,
    tokens: usize,
    input_cost_usd: f64,
    output_cost_usd: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Prices => {
            println!("{}", serde_json::to_string_pretty(&prices())?);
        }
        Commands::Charge { action, state } => {
            let result = charge(&action, &state)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.charged {
                std::process::exit(1);
            }
        }
        Commands::Estimate { source, provider } => {
            let result = estimate(&source, &provider)?;
            println!("{}", serde_json::to_string(&result)?);
        }
        Commands::ValidateLead { file } => {
            let result = validate_lead(&file)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn prices() -> PricesResult {
    PricesResult {
        starting_balance: STARTING_BALANCE,
        actions: ActionKind::all()
            .iter()
            .map(|kind| PriceEntry {
                action: kind.as_str().to_string(),
                price: kind.price(),
            })
            .collect(),
    }
}

fn charge(action_str: &str, state_file: &PathBuf) -> Result<ChargeResult> {
    let kind: ActionKind = action_str.parse().with_context(|| {
        format!(
            "Unknown action: {}. Valid: briefing.basic, analysis.deep, google_ads.briefing, file.upload.parse, chat.message",
            action_str
        )
    })?;

    // State file mirrors the key-value store the ledger persists into.
    let mut values: HashMap<String, String> = if state_file.exists() {
        let content = fs::read_to_string(state_file)
            .with_context(|| format!("Failed to read state file: {}", state_file.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid state file: {}", state_file.display()))?
    } else {
        HashMap::new()
    };

    let mut store = MemoryStore::new();
    for (key, value) in &values {
        store.save(key, value);
    }

    let mut ledger = CreditLedger::new(store);
    let charged = ledger.charge(kind);
    let balance = ledger.balance();

    values.insert(BALANCE_KEY.to_string(), balance.to_string());
    if let Some(dir) = state_file.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    fs::write(state_file, serde_json::to_string_pretty(&values)?)
        .with_context(|| format!("Failed to write state file: {}", state_file.display()))?;

    Ok(ChargeResult {
        action: kind.as_str().to_string(),
        price: kind.price(),
        charged,
        balance,
    })
}

fn estimate(source: &str, provider_str: &str) -> Result<EstimateResult> {
    let provider: Provider = provider_str
        .parse()
        .with_context(|| format!("Invalid provider: {}. Valid: openai, gemini", provider_str))?;

    let content = if source == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        fs::read_to_string(source).with_context(|| format!("Failed to read file: {}", source))?
    };

    let estimator = TokenEstimator::new();
    let tokens = estimator.count(&content);

    Ok(EstimateResult {
        provider: provider.as_str().to_string(),
        tokens,
        input_cost_usd: estimate_cost(provider, tokens as u64, 0),
        output_cost_usd: estimate_cost(provider, 0, tokens as u64),
    })
}

fn validate_lead(file: &PathBuf) -> Result<LeadValidation> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let lead: Lead = match serde_json::from_str(&content) {
        Ok(l) => l,
        Err(e) => {
            return Ok(LeadValidation {
                valid: false,
                errors: vec![format!("Invalid JSON: {}", e)],
            });
        }
    };

    Ok(lead.validate())
}
