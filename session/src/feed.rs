use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Most recent entries kept in the feed. Older ones fall off the end.
pub const FEED_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ActivityKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityKind::Info => "info",
            ActivityKind::Success => "success",
            ActivityKind::Warning => "warning",
            ActivityKind::Error => "error",
        }
    }
}

/// Draft of a feed entry. The feed assigns the id and timestamp on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub title: String,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub kind: ActivityKind,
}

impl Activity {
    pub fn new(kind: ActivityKind, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            kind,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(ActivityKind::Info, title)
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(ActivityKind::Success, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(ActivityKind::Warning, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(ActivityKind::Error, title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: String,
    pub timestamp: u64,
    pub title: String,
    pub subtitle: Option<String>,
    pub kind: ActivityKind,
    pub signature: Option<String>,
}

/// Bounded, newest-first activity feed with optional signature dedup.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ActivityFeed {
    items: VecDeque<ActivityItem>,
    next_id: u64,
}

impl ActivityFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at the front and returns the assigned id.
    pub fn add(&mut self, activity: Activity) -> String {
        self.push(activity, None)
    }

    /// Inserts only if no retained entry carries the same signature.
    /// Returns `None` when the entry was suppressed as a duplicate.
    pub fn add_once(&mut self, signature: impl Into<String>, activity: Activity) -> Option<String> {
        let signature = signature.into();
        let seen = self
            .items
            .iter()
            .any(|item| item.signature.as_deref() == Some(signature.as_str()));
        if seen {
            return None;
        }
        Some(self.push(activity, Some(signature)))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Entries newest first.
    pub fn items(&self) -> impl Iterator<Item = &ActivityItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, activity: Activity, signature: Option<String>) -> String {
        self.next_id += 1;
        let id = format!("act-{}", self.next_id);
        self.items.push_front(ActivityItem {
            id: id.clone(),
            timestamp: now(),
            title: activity.title,
            subtitle: activity.subtitle,
            kind: activity.kind,
            signature,
        });
        self.items.truncate(FEED_CAPACITY);
        id
    }
}

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
