//! Callback payload grammar.
//!
//! Every inline button carries `<action>:<token>`.

use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DraftToken, ValidationError};
use crate::domain::listing::EditableField;

/// An action requested by pressing an inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Submitter finalizes the draft.
    Finish(DraftToken),
    /// Moderator starts editing a field.
    Edit(EditableField, DraftToken),
    /// Moderator approves; the public post is updated in place.
    Publish(DraftToken),
    /// Moderator rejects; the public post is withdrawn.
    Reject(DraftToken),
}

impl CallbackAction {
    pub fn token(&self) -> &DraftToken {
        match self {
            CallbackAction::Finish(token)
            | CallbackAction::Edit(_, token)
            | CallbackAction::Publish(token)
            | CallbackAction::Reject(token) => token,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            CallbackAction::Finish(_) => "finish",
            CallbackAction::Edit(EditableField::Price, _) => "edit_price",
            CallbackAction::Edit(EditableField::Description, _) => "edit_desc",
            CallbackAction::Publish(_) => "publish",
            CallbackAction::Reject(_) => "reject",
        }
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix(), self.token())
    }
}

impl FromStr for CallbackAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (action, raw_token) = s
            .split_once(':')
            .ok_or_else(|| ValidationError::invalid_format("callback", "missing ':'"))?;
        let token = DraftToken::parse(raw_token)?;
        match action {
            "finish" => Ok(CallbackAction::Finish(token)),
            "edit_price" => Ok(CallbackAction::Edit(EditableField::Price, token)),
            "edit_desc" => Ok(CallbackAction::Edit(EditableField::Description, token)),
            "publish" => Ok(CallbackAction::Publish(token)),
            "reject" => Ok(CallbackAction::Reject(token)),
            other => Err(ValidationError::invalid_format(
                "callback",
                format!("unknown action '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> DraftToken {
        DraftToken::parse("abc123").unwrap()
    }

    #[test]
    fn parses_every_action() {
        assert_eq!(
            "finish:abc123".parse::<CallbackAction>().unwrap(),
            CallbackAction::Finish(token())
        );
        assert_eq!(
            "edit_price:abc123".parse::<CallbackAction>().unwrap(),
            CallbackAction::Edit(EditableField::Price, token())
        );
        assert_eq!(
            "edit_desc:abc123".parse::<CallbackAction>().unwrap(),
            CallbackAction::Edit(EditableField::Description, token())
        );
        assert_eq!(
            "publish:abc123".parse::<CallbackAction>().unwrap(),
            CallbackAction::Publish(token())
        );
        assert_eq!(
            "reject:abc123".parse::<CallbackAction>().unwrap(),
            CallbackAction::Reject(token())
        );
    }

    #[test]
    fn formats_back_to_payload() {
        let action = CallbackAction::Edit(EditableField::Description, token());
        assert_eq!(action.to_string(), "edit_desc:abc123");
    }

    #[test]
    fn rejects_unknown_or_malformed_payloads() {
        for raw in ["finish", "approve:abc123", "publish:", "reject:a-b"] {
            assert!(raw.parse::<CallbackAction>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn payload_fits_bot_api_limit() {
        let action = CallbackAction::Edit(EditableField::Price, DraftToken::new());
        assert!(action.to_string().len() <= 64);
    }
}
