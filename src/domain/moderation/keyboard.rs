//! Inline keyboards attached to submitter and moderator messages.

use serde::{Deserialize, Serialize};

use super::callback::CallbackAction;
use crate::domain::foundation::DraftToken;
use crate::domain::listing::EditableField;

/// One inline button carrying a callback payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, action: &CallbackAction) -> Self {
        Self {
            text: text.into(),
            callback_data: action.to_string(),
        }
    }
}

/// Rows of inline buttons, serialized in the Bot API markup shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InlineKeyboard {
    #[serde(rename = "inline_keyboard")]
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// All callback payloads, row by row.
    pub fn payloads(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .flatten()
            .map(|button| button.callback_data.as_str())
    }
}

/// The submitter's single "publish" button.
pub fn finish_controls(token: &DraftToken) -> InlineKeyboard {
    InlineKeyboard::new(vec![vec![InlineButton::new(
        "📣 انتشار در گروه",
        &CallbackAction::Finish(token.clone()),
    )]])
}

/// Review controls on every moderator panel.
pub fn review_controls(token: &DraftToken) -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![
            InlineButton::new(
                "✏️ ویرایش قیمت",
                &CallbackAction::Edit(EditableField::Price, token.clone()),
            ),
            InlineButton::new(
                "📝 ویرایش توضیحات",
                &CallbackAction::Edit(EditableField::Description, token.clone()),
            ),
        ],
        vec![InlineButton::new(
            "✅ اعمال روی پست گروه",
            &CallbackAction::Publish(token.clone()),
        )],
        vec![InlineButton::new(
            "❌ رد",
            &CallbackAction::Reject(token.clone()),
        )],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_controls_cover_every_moderator_action() {
        let token = DraftToken::parse("t1").unwrap();
        let payloads: Vec<_> = review_controls(&token).payloads().map(String::from).collect();
        assert_eq!(
            payloads,
            vec!["edit_price:t1", "edit_desc:t1", "publish:t1", "reject:t1"]
        );
    }

    #[test]
    fn finish_controls_carry_the_token() {
        let token = DraftToken::parse("t1").unwrap();
        let keyboard = finish_controls(&token);
        assert_eq!(keyboard.payloads().collect::<Vec<_>>(), vec!["finish:t1"]);
    }

    #[test]
    fn serializes_in_bot_api_shape() {
        let token = DraftToken::parse("t1").unwrap();
        let json = serde_json::to_value(finish_controls(&token)).unwrap();
        assert_eq!(json["inline_keyboard"][0][0]["callback_data"], "finish:t1");
    }
}
