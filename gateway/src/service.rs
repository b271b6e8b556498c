use economy::{ActionKind, CreditLedger, TokenEstimator, UsageMeter};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use session::{Activity, ActivityFeed, EcosystemCache};

use crate::chat::{ChatProvider, ChatReply, ChatRequest};

/// Shown to the user when the upstream model cannot be reached.
pub const DEGRADED_MESSAGE: &str = "service temporarily unavailable";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatOutcome {
    Reply { reply: ChatReply },
    InsufficientCredits { balance: u64, price: u64 },
    Degraded { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BriefingOutcome {
    Ready { channel: String },
    InsufficientCredits { balance: u64, price: u64 },
}

/// Front door for assistant features. Owns the session state and runs every
/// priced action through the ledger before touching a provider.
pub struct AssistantService {
    ledger: CreditLedger,
    meter: UsageMeter,
    feed: ActivityFeed,
    ecosystem: EcosystemCache,
    estimator: TokenEstimator,
    provider: Box<dyn ChatProvider>,
}

impl AssistantService {
    pub fn new(ledger: CreditLedger, provider: Box<dyn ChatProvider>) -> Self {
        Self {
            ledger,
            meter: UsageMeter::new(),
            feed: ActivityFeed::new(),
            ecosystem: EcosystemCache::new(),
            estimator: TokenEstimator::new(),
            provider,
        }
    }

    pub fn ledger(&self) -> &CreditLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut CreditLedger {
        &mut self.ledger
    }

    pub fn meter(&self) -> &UsageMeter {
        &self.meter
    }

    pub fn feed(&self) -> &ActivityFeed {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut ActivityFeed {
        &mut self.feed
    }

    pub fn ecosystem(&self) -> &EcosystemCache {
        &self.ecosystem
    }

    pub fn ecosystem_mut(&mut self) -> &mut EcosystemCache {
        &mut self.ecosystem
    }

    /// Charges for one chat message, forwards it to the provider, and meters
    /// the usage. A provider failure degrades the reply; the charge stands
    /// because the attempt was made.
    pub fn handle_message(&mut self, request: ChatRequest) -> ChatOutcome {
        if !self.ledger.charge(ActionKind::ChatMessage) {
            return ChatOutcome::InsufficientCredits {
                balance: self.ledger.balance(),
                price: ActionKind::ChatMessage.price(),
            };
        }

        let reply = match self.provider.send(&request) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "chat provider call failed");
                self.feed.add(
                    Activity::warning("Assistant temporarily unavailable")
                        .with_subtitle(err.to_string()),
                );
                return ChatOutcome::Degraded {
                    message: DEGRADED_MESSAGE.to_string(),
                };
            }
        };

        let raw = match reply.usage {
            Some(usage) => usage.into(),
            None => {
                let prompt = match &request.context {
                    Some(context) => format!("{}\n{}", context, request.message),
                    None => request.message.clone(),
                };
                self.estimator.estimate_usage(&prompt, &reply.message)
            }
        };
        self.meter.record(self.provider.provider(), raw);

        ChatOutcome::Reply { reply }
    }

    /// Charges for a Google Ads briefing, parks the findings for the channel
    /// page to consume, and posts one feed entry per channel.
    pub fn run_ads_briefing(&mut self, channel: &str, findings: Map<String, Value>) -> BriefingOutcome {
        if !self.ledger.charge(ActionKind::GoogleAdsBriefing) {
            return BriefingOutcome::InsufficientCredits {
                balance: self.ledger.balance(),
                price: ActionKind::GoogleAdsBriefing.price(),
            };
        }

        self.ecosystem.set_summary(channel, findings);
        self.feed.add_once(
            format!("ads-briefing:{channel}"),
            Activity::success("Google Ads briefing ready").with_subtitle(channel),
        );

        BriefingOutcome::Ready {
            channel: channel.to_string(),
        }
    }
}
