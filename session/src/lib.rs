mod mailbox;
mod ecosystem;
mod feed;
mod quickreply;

pub use mailbox::Mailbox;
pub use ecosystem::{ChannelSummary, EcosystemCache};
pub use feed::{Activity, ActivityFeed, ActivityItem, ActivityKind, FEED_CAPACITY};
pub use quickreply::{
    PromptState, QuickReplyError, QuickReplyGroup, QuickReplyOption, QuickReplyPrompt,
    QuickReplyResponse, ToggleOutcome,
};
