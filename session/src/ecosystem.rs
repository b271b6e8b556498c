use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mailbox::Mailbox;

/// Snapshot of one marketing channel. The fields are free-form so each
/// channel can report its own shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub updated_at: u64,
}

/// Per-channel mailboxes for freshly computed summaries. Writers merge onto
/// whatever is still pending; a reader consumes the slot in one take.
#[derive(Debug, Default)]
pub struct EcosystemCache {
    channels: HashMap<String, Mailbox<ChannelSummary>>,
}

impl EcosystemCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `patch` into any pending summary for the channel and stamps
    /// `updated_at`. Later keys win on conflict.
    pub fn set_summary(&mut self, channel: impl Into<String>, patch: Map<String, Value>) {
        let mailbox = self.channels.entry(channel.into()).or_default();
        let mut fields = match mailbox.take_if_present() {
            Some(summary) => summary.fields,
            None => Map::new(),
        };
        for (key, value) in patch {
            fields.insert(key, value);
        }
        // The stamp is authoritative; a patch must not smuggle its own in.
        fields.remove("updated_at");
        mailbox.put(ChannelSummary {
            fields,
            updated_at: now(),
        });
    }

    /// Consumes the pending summary for the channel, if any.
    pub fn get_and_clear(&mut self, channel: &str) -> Option<ChannelSummary> {
        self.channels
            .get_mut(channel)
            .and_then(Mailbox::take_if_present)
    }

    /// Reads the pending summary without consuming it.
    pub fn peek(&self, channel: &str) -> Option<&ChannelSummary> {
        self.channels.get(channel).and_then(Mailbox::peek)
    }
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
    use serde_json::json;

    fn patch(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_writes_merge_until_consumed() {
        let mut cache = EcosystemCache::new();
        cache.set_summary("instagram", patch(&[("followers", json!(1200))]));
        cache.set_summary("instagram", patch(&[("engagement", json!("4.2%"))]));

        let summary = cache.get_and_clear("instagram").unwrap();
        assert_eq!(summary.fields["followers"], json!(1200));
        assert_eq!(summary.fields["engagement"], json!("4.2%"));

        assert!(cache.get_and_clear("instagram").is_none());
    }

    #[test]
    fn test_later_write_wins_on_same_key() {
        let mut cache = EcosystemCache::new();
        cache.set_summary("ads", patch(&[("spend", json!(100))]));
        cache.set_summary("ads", patch(&[("spend", json!(250))]));

        let summary = cache.get_and_clear("ads").unwrap();
        assert_eq!(summary.fields["spend"], json!(250));
    }

    #[test]
    fn test_peek_does_not_clear() {
        let mut cache = EcosystemCache::new();
        cache.set_summary("seo", patch(&[("rank", json!(3))]));

        assert!(cache.peek("seo").is_some());
        assert!(cache.peek("seo").is_some());
        assert!(cache.get_and_clear("seo").is_some());
        assert!(cache.peek("seo").is_none());
    }

    #[test]
    fn test_unknown_channel_is_empty() {
        let mut cache = EcosystemCache::new();
        assert!(cache.get_and_clear("tiktok").is_none());
        assert!(cache.peek("tiktok").is_none());
    }

    #[test]
    fn test_updated_at_is_stamped_not_patched() {
        let mut cache = EcosystemCache::new();
        cache.set_summary(
            "email",
            patch(&[("updated_at", json!(1)), ("opens", json!(88))]),
        );

        let summary = cache.get_and_clear("email").unwrap();
        assert!(summary.updated_at > 1);
        assert!(!summary.fields.contains_key("updated_at"));
    }

    #[test]
    fn test_summary_serializes_flat() {
        let mut cache = EcosystemCache::new();
        cache.set_summary("instagram", patch(&[("followers", json!(1200))]));

        let summary = cache.get_and_clear("instagram").unwrap();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["followers"], json!(1200));
        assert!(value["updated_at"].is_u64());
    }
}
