mod chat;
mod service;
mod leads;

pub use chat::{ChatProvider, ChatReply, ChatRequest, ProviderError, ProviderUsage};
pub use service::{AssistantService, BriefingOutcome, ChatOutcome, DEGRADED_MESSAGE};
pub use leads::{
    capture_lead, Lead, LeadError, LeadId, LeadStore, LeadValidation, MemoryLeadStore, Notifier,
    NotifyError,
};
