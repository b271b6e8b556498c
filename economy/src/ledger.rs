use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::prices::{ActionKind, STARTING_BALANCE};

/// Key the balance is persisted under, as a decimal string.
pub const BALANCE_KEY: &str = "cb_credits_balance_v1";

/// Event name carried by balance broadcasts at the UI boundary.
pub const BALANCE_EVENT: &str = "cb:credits-updated";

/// Durable key/value storage for the balance. Synchronous and infallible,
/// last-writer-wins, like the browser-local storage it stands in for.
pub trait BalanceStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalanceStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// Payload of a `cb:credits-updated` broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceUpdate {
    pub balance: u64,
}

pub type SubscriberId = u64;

/// Session credit balance with a fixed price table and synchronous change
/// broadcasts. Balance never goes below zero; a charge that would is
/// rejected without mutating or notifying.
pub struct CreditLedger {
    store: Box<dyn BalanceStore>,
    balance: u64,
    listeners: Vec<(SubscriberId, Box<dyn FnMut(BalanceUpdate)>)>,
    next_subscriber: SubscriberId,
}

impl CreditLedger {
    pub fn new(store: impl BalanceStore + 'static) -> Self {
        Self::with_starting_balance(store, STARTING_BALANCE)
    }

    pub fn with_starting_balance(store: impl BalanceStore + 'static, starting: u64) -> Self {
        let mut store: Box<dyn BalanceStore> = Box::new(store);
        let balance = match store.load(BALANCE_KEY).and_then(|raw| raw.parse::<u64>().ok()) {
            Some(balance) => balance,
            None => {
                store.save(BALANCE_KEY, &starting.to_string());
                starting
            }
        };

        Self {
            store,
            balance,
            listeners: Vec::new(),
            next_subscriber: 0,
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Persists `max(0, value)` and broadcasts exactly one update carrying
    /// the clamped balance.
    pub fn set_balance(&mut self, value: i64) {
        let clamped = value.max(0) as u64;
        self.persist(clamped);
    }

    /// Debits the price of `kind`. Returns false and leaves the ledger
    /// untouched when the balance does not cover the price; insufficient
    /// funds is a normal outcome, not an error.
    pub fn charge(&mut self, kind: ActionKind) -> bool {
        let price = kind.price();
        if self.balance < price {
            return false;
        }
        self.persist(self.balance - price);
        true
    }

    /// Registers a listener invoked synchronously, in registration order,
    /// after every balance mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriberId
    where
        F: FnMut(BalanceUpdate) + 'static,
    {
        self.next_subscriber += 1;
        self.listeners.push((self.next_subscriber, Box::new(listener)));
        self.next_subscriber
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(subscriber, _)| *subscriber != id);
        self.listeners.len() != before
    }

    fn persist(&mut self, balance: u64) {
        self.balance = balance;
        self.store.save(BALANCE_KEY, &balance.to_string());

        let update = BalanceUpdate { balance };
        for (_, listener) in self.listeners.iter_mut() {
            listener(update);
        }
    }
}
