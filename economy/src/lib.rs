mod prices;
mod ledger;
mod rates;
mod meter;
mod estimate;

pub use prices::{ActionKind, ParseActionError, STARTING_BALANCE};
pub use ledger::{
    BalanceStore, BalanceUpdate, CreditLedger, MemoryStore, SubscriberId, BALANCE_EVENT,
    BALANCE_KEY,
};
pub use rates::{estimate_cost, rates, ProviderRates};
pub use meter::{ParseProviderError, Provider, RawUsage, UsageEntry, UsageMeter};
pub use estimate::TokenEstimator;
