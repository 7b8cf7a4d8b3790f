//! Moderator edit intents and panel outcomes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::DraftToken;
use crate::domain::listing::{
    EditableField, PANEL_APPLIED_TEXT, PANEL_REJECTED_TEXT, PANEL_SETTLED_TEXT,
};

/// "The next plain-text reply from this moderator sets `field` on `token`."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditIntent {
    pub token: DraftToken,
    pub field: EditableField,
}

impl EditIntent {
    pub fn new(token: DraftToken, field: EditableField) -> Self {
        Self { token, field }
    }

    /// Prompt sent to the moderator when the intent opens.
    pub fn prompt(&self) -> &'static str {
        match self.field {
            EditableField::Price => {
                "قیمت جدید را با ارقام لاتین و بر حسب میلیون بفرستید (حداکثر سه رقم اعشار). مثال: 120.5"
            }
            EditableField::Description => "توضیحات جدید را بفرستید.",
        }
    }
}

/// Terminal state of a draft as shown on moderator panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOutcome {
    Applied,
    Rejected,
    /// Finalized by another moderator before this panel was recorded.
    Settled,
}

impl PanelOutcome {
    pub fn text(&self) -> &'static str {
        match self {
            PanelOutcome::Applied => PANEL_APPLIED_TEXT,
            PanelOutcome::Rejected => PANEL_REJECTED_TEXT,
            PanelOutcome::Settled => PANEL_SETTLED_TEXT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_depends_on_field() {
        let token = DraftToken::new();
        let price = EditIntent::new(token.clone(), EditableField::Price);
        let desc = EditIntent::new(token, EditableField::Description);
        assert!(price.prompt().contains("120.5"));
        assert_ne!(price.prompt(), desc.prompt());
    }

    #[test]
    fn outcomes_map_to_terminal_texts() {
        assert_eq!(PanelOutcome::Applied.text(), PANEL_APPLIED_TEXT);
        assert_eq!(PanelOutcome::Rejected.text(), PANEL_REJECTED_TEXT);
        assert_eq!(PanelOutcome::Settled.text(), PANEL_SETTLED_TEXT);
    }
}
