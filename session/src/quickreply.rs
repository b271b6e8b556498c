use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuickReplyError {
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    #[error("Prompt already confirmed")]
    AlreadyConfirmed,
    #[error("Custom text not allowed for this prompt")]
    CustomTextNotAllowed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReplyOption {
    pub id: String,
    pub label: String,
}

impl QuickReplyOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A set of canned answers offered alongside an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickReplyGroup {
    pub id: String,
    pub title: String,
    pub options: Vec<QuickReplyOption>,
    pub multi_select: bool,
    pub allow_custom: bool,
    pub custom_placeholder: Option<String>,
}

impl QuickReplyGroup {
    pub fn single_select(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            options: Vec::new(),
            multi_select: false,
            allow_custom: false,
            custom_placeholder: None,
        }
    }

    pub fn multi_select(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            multi_select: true,
            ..Self::single_select(id, title)
        }
    }

    pub fn with_option(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(QuickReplyOption::new(id, label));
        self
    }

    pub fn with_custom_input(mut self, placeholder: impl Into<String>) -> Self {
        self.allow_custom = true;
        self.custom_placeholder = Some(placeholder.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptState {
    #[default]
    Unselected,
    Selecting,
    Confirmed,
}

/// What the user settled on, resolved back to full options in the order
/// they were picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReplyResponse {
    pub group_id: String,
    pub picked: Vec<QuickReplyOption>,
    pub custom_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Multi-select prompts stay open; the current pick list is returned.
    Updated { picked: Vec<String> },
    /// Single-select prompts confirm on the first pick.
    Confirmed(QuickReplyResponse),
}

/// Interaction state for one quick-reply group. A prompt confirms exactly
/// once; after that every mutation is rejected.
#[derive(Debug, Clone)]
pub struct QuickReplyPrompt {
    group: QuickReplyGroup,
    picked: Vec<String>,
    custom_text: String,
    state: PromptState,
}

impl QuickReplyPrompt {
    pub fn new(group: QuickReplyGroup) -> Self {
        Self {
            group,
            picked: Vec::new(),
            custom_text: String::new(),
            state: PromptState::Unselected,
        }
    }

    pub fn group(&self) -> &QuickReplyGroup {
        &self.group
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    pub fn picked(&self) -> &[String] {
        &self.picked
    }

    pub fn custom_text(&self) -> &str {
        &self.custom_text
    }

    /// Picks or unpicks an option. On a single-select group the first pick
    /// confirms the prompt immediately.
    pub fn toggle(&mut self, option_id: &str) -> Result<ToggleOutcome, QuickReplyError> {
        if self.state == PromptState::Confirmed {
            return Err(QuickReplyError::AlreadyConfirmed);
        }
        if !self.group.options.iter().any(|o| o.id == option_id) {
            return Err(QuickReplyError::UnknownOption(option_id.to_string()));
        }

        if self.group.multi_select {
            match self.picked.iter().position(|id| id == option_id) {
                Some(index) => {
                    self.picked.remove(index);
                }
                None => self.picked.push(option_id.to_string()),
            }
            self.state = if self.picked.is_empty() {
                PromptState::Unselected
            } else {
                PromptState::Selecting
            };
            Ok(ToggleOutcome::Updated {
                picked: self.picked.clone(),
            })
        } else {
            self.picked = vec![option_id.to_string()];
            Ok(ToggleOutcome::Confirmed(self.finish()))
        }
    }

    /// Stores free-form text to send along with the picks.
    pub fn set_custom_text(&mut self, text: impl Into<String>) -> Result<(), QuickReplyError> {
        if self.state == PromptState::Confirmed {
            return Err(QuickReplyError::AlreadyConfirmed);
        }
        if !self.group.allow_custom {
            return Err(QuickReplyError::CustomTextNotAllowed);
        }
        self.custom_text = text.into();
        Ok(())
    }

    /// Confirms whatever is currently picked. An empty selection is a valid
    /// answer.
    pub fn confirm(&mut self) -> Result<QuickReplyResponse, QuickReplyError> {
        if self.state == PromptState::Confirmed {
            return Err(QuickReplyError::AlreadyConfirmed);
        }
        Ok(self.finish())
    }

    fn finish(&mut self) -> QuickReplyResponse {
        let picked = self
            .picked
            .iter()
            .filter_map(|id| self.group.options.iter().find(|o| &o.id == id).cloned())
            .collect();
        let trimmed = self.custom_text.trim();
        let custom_text = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };

        // The response is the only thing that survives confirmation.
        self.picked.clear();
        self.custom_text.clear();
        self.state = PromptState::Confirmed;

        QuickReplyResponse {
            group_id: self.group.id.clone(),
            picked,
            custom_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone_group() -> QuickReplyGroup {
        QuickReplyGroup::single_select("tone", "Which tone fits your brand?")
            .with_option("friendly", "Friendly")
            .with_option("formal", "Formal")
    }

    fn goals_group() -> QuickReplyGroup {
        QuickReplyGroup::multi_select("goals", "What are you aiming for?")
            .with_option("reach", "More reach")
            .with_option("leads", "More leads")
            .with_option("retention", "Better retention")
            .with_custom_input("Anything else?")
    }

    #[test]
    fn test_single_select_confirms_on_first_pick() {
        let mut prompt = QuickReplyPrompt::new(tone_group());

        match prompt.toggle("friendly").unwrap() {
            ToggleOutcome::Confirmed(response) => {
                assert_eq!(response.group_id, "tone");
                assert_eq!(response.picked.len(), 1);
                assert_eq!(response.picked[0].id, "friendly");
            }
            ToggleOutcome::Updated { .. } => panic!("single select should confirm"),
        }
        assert_eq!(prompt.state(), PromptState::Confirmed);
    }

    #[test]
    fn test_multi_select_toggles_membership() {
        let mut prompt = QuickReplyPrompt::new(goals_group());

        prompt.toggle("reach").unwrap();
        prompt.toggle("leads").unwrap();
        assert_eq!(prompt.picked(), ["reach", "leads"]);
        assert_eq!(prompt.state(), PromptState::Selecting);

        prompt.toggle("reach").unwrap();
        assert_eq!(prompt.picked(), ["leads"]);
    }

    #[test]
    fn test_deselecting_everything_returns_to_unselected() {
        let mut prompt = QuickReplyPrompt::new(goals_group());

        prompt.toggle("reach").unwrap();
        prompt.toggle("reach").unwrap();

        assert!(prompt.picked().is_empty());
        assert_eq!(prompt.state(), PromptState::Unselected);
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let mut prompt = QuickReplyPrompt::new(goals_group());
        assert_eq!(
            prompt.toggle("virality"),
            Err(QuickReplyError::UnknownOption("virality".to_string()))
        );
    }

    #[test]
    fn test_selection_order_is_preserved() {
        let mut prompt = QuickReplyPrompt::new(goals_group());
        prompt.toggle("retention").unwrap();
        prompt.toggle("reach").unwrap();

        let response = prompt.confirm().unwrap();
        let ids: Vec<&str> = response.picked.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["retention", "reach"]);
    }

    #[test]
    fn test_confirm_with_empty_selection_is_valid() {
        let mut prompt = QuickReplyPrompt::new(goals_group());
        let response = prompt.confirm().unwrap();

        assert!(response.picked.is_empty());
        assert!(response.custom_text.is_none());
        assert_eq!(prompt.state(), PromptState::Confirmed);
    }

    #[test]
    fn test_custom_text_is_trimmed_into_response() {
        let mut prompt = QuickReplyPrompt::new(goals_group());
        prompt.toggle("leads").unwrap();
        prompt.set_custom_text("  grow the newsletter  ").unwrap();

        let response = prompt.confirm().unwrap();
        assert_eq!(response.custom_text.as_deref(), Some("grow the newsletter"));
    }

    #[test]
    fn test_blank_custom_text_becomes_none() {
        let mut prompt = QuickReplyPrompt::new(goals_group());
        prompt.set_custom_text("   ").unwrap();

        let response = prompt.confirm().unwrap();
        assert!(response.custom_text.is_none());
    }

    #[test]
    fn test_custom_text_rejected_when_not_enabled() {
        let mut prompt = QuickReplyPrompt::new(tone_group());
        assert_eq!(
            prompt.set_custom_text("something else"),
            Err(QuickReplyError::CustomTextNotAllowed)
        );
    }

    #[test]
    fn test_confirmed_prompt_rejects_further_changes() {
        let mut prompt = QuickReplyPrompt::new(goals_group());
        prompt.toggle("reach").unwrap();
        prompt.confirm().unwrap();

        assert_eq!(prompt.toggle("leads"), Err(QuickReplyError::AlreadyConfirmed));
        assert_eq!(
            prompt.set_custom_text("late"),
            Err(QuickReplyError::AlreadyConfirmed)
        );
        assert!(matches!(
            prompt.confirm(),
            Err(QuickReplyError::AlreadyConfirmed)
        ));
    }

    #[test]
    fn test_confirm_discards_local_selection_state() {
        let mut prompt = QuickReplyPrompt::new(goals_group());
        prompt.toggle("reach").unwrap();
        prompt.set_custom_text("and a blog").unwrap();

        let response = prompt.confirm().unwrap();
        assert_eq!(response.picked[0].id, "reach");

        assert!(prompt.picked().is_empty());
        assert!(prompt.custom_text().is_empty());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&PromptState::Unselected).unwrap();
        assert_eq!(json, "\"unselected\"");
    }
}
