use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use session::{Activity, ActivityFeed};
use thiserror::Error;

pub type LeadId = String;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeadError {
    #[error("Invalid lead: {0}")]
    Invalid(String),
    #[error("A lead with email {0} already exists")]
    DuplicateEmail(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: Option<String>,
}

impl Lead {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            company: None,
            message: None,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn validate(&self) -> LeadValidation {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name must not be empty".to_string());
        }
        if !is_plausible_email(&self.email) {
            errors.push(format!("Invalid email address: {}", self.email));
        }
        LeadValidation {
            valid: errors.is_empty(),
            errors,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    let (local, domain) = (parts[0], parts[1]);
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Where captured leads end up. The production store is the CRM; tests use
/// the in-memory one.
pub trait LeadStore {
    fn insert(&mut self, lead: &Lead) -> Result<LeadId, LeadError>;
}

#[derive(Debug, Default)]
pub struct MemoryLeadStore {
    leads: HashMap<String, Lead>,
    next_id: u64,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, email: &str) -> Option<&Lead> {
        self.leads.get(&email.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }
}

impl LeadStore for MemoryLeadStore {
    fn insert(&mut self, lead: &Lead) -> Result<LeadId, LeadError> {
        let key = lead.email.to_lowercase();
        if self.leads.contains_key(&key) {
            return Err(LeadError::DuplicateEmail(lead.email.clone()));
        }
        self.next_id += 1;
        self.leads.insert(key, lead.clone());
        Ok(format!("lead-{}", self.next_id))
    }
}

/// Side channel told about new leads, typically email. Failures here must
/// never undo the capture.
pub trait Notifier {
    fn lead_captured(&mut self, lead: &Lead) -> Result<(), NotifyError>;
}

/// Validates and stores a lead, then notifies and posts to the feed. The
/// notification is best effort; a failure is logged and the lead stays
/// captured.
pub fn capture_lead(
    store: &mut dyn LeadStore,
    notifier: &mut dyn Notifier,
    feed: &mut ActivityFeed,
    lead: Lead,
) -> Result<LeadId, LeadError> {
    let validation = lead.validate();
    if !validation.valid {
        return Err(LeadError::Invalid(validation.errors.join("; ")));
    }

    let id = store.insert(&lead)?;

    if let Err(err) = notifier.lead_captured(&lead) {
        tracing::warn!(error = %err, email = %lead.email, "lead notification failed");
    }
    feed.add(Activity::success("New lead captured").with_subtitle(lead.email.clone()));

    Ok(id)
}
