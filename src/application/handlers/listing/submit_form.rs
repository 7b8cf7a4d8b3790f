//! SubmitFormHandler - turns a web-app form payload into a draft.

use std::sync::Arc;
use tracing::{debug, info};

use crate::application::policy::DeskPolicy;
use crate::application::services::MembershipGate;
use crate::application::sessions::PhotoCollectionSessions;
use crate::domain::foundation::{DraftToken, UserId};
use crate::domain::listing::{ListingError, ListingForm, RawSubmission};
use crate::ports::DraftStore;

/// Command carrying the raw form payload.
#[derive(Debug, Clone)]
pub struct SubmitFormCommand {
    pub submitter_id: UserId,
    pub submitter_handle: Option<String>,
    pub payload: String,
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitFormResult {
    pub token: DraftToken,
    /// Token of the draft whose photo session this submission replaced.
    pub replaced_session: Option<DraftToken>,
}

/// Handler for form submissions.
pub struct SubmitFormHandler {
    gate: Arc<MembershipGate>,
    drafts: Arc<dyn DraftStore>,
    photo_sessions: Arc<PhotoCollectionSessions>,
    policy: Arc<DeskPolicy>,
}

impl SubmitFormHandler {
    pub fn new(
        gate: Arc<MembershipGate>,
        drafts: Arc<dyn DraftStore>,
        photo_sessions: Arc<PhotoCollectionSessions>,
        policy: Arc<DeskPolicy>,
    ) -> Self {
        Self {
            gate,
            drafts,
            photo_sessions,
            policy,
        }
    }

    pub async fn handle(&self, cmd: SubmitFormCommand) -> Result<SubmitFormResult, ListingError> {
        // 1. Membership gate
        self.gate.check(cmd.submitter_id).await?;

        // 2. Validate and normalize
        let raw = RawSubmission::from_json(&cmd.payload);
        let form = ListingForm::from_submission(&raw, cmd.submitter_handle)?;

        // 3. Create the draft
        let pending = self.policy.initial_pending(&form);
        let token = self.drafts.create(cmd.submitter_id, form, pending).await;

        // 4. Open the photo window
        let replaced = self
            .photo_sessions
            .open(cmd.submitter_id, token.clone())
            .await
            .map(|session| session.token);
        if let Some(previous) = &replaced {
            debug!(submitter = %cmd.submitter_id, previous = %previous, "photo session replaced");
        }

        info!(token = %token, submitter = %cmd.submitter_id, "draft created");
        Ok(SubmitFormResult {
            token,
            replaced_session: replaced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{Desk, CHANNEL, SUBMITTER};
    use crate::domain::listing::EditableField;
    use crate::ports::MemberStatus;
    use serde_json::json;

    fn handler(desk: &Desk) -> SubmitFormHandler {
        SubmitFormHandler::new(
            desk.gate.clone(),
            desk.drafts.clone(),
            desk.photo_sessions.clone(),
            Arc::new(desk.policy.clone()),
        )
    }

    fn payload() -> String {
        json!({
            "category": "sale",
            "car": "پراید 131",
            "year": "۱۳۹۹",
            "color": "مشکی",
            "km": "85000",
            "insurance": "",
            "gear": "دستی",
            "desc": "تمیز",
            "phone": "09121234567",
            "million_price": "80"
        })
        .to_string()
    }

    fn cmd(payload: String) -> SubmitFormCommand {
        SubmitFormCommand {
            submitter_id: SUBMITTER,
            submitter_handle: Some("seller".to_string()),
            payload,
        }
    }

    #[tokio::test]
    async fn creates_draft_and_opens_photo_session() {
        let desk = Desk::new();
        let result = handler(&desk).handle(cmd(payload())).await.unwrap();

        let draft = desk.drafts.get(&result.token).await.unwrap();
        assert_eq!(draft.submitter_id(), SUBMITTER);
        assert_eq!(draft.form().year(), 1399);
        assert!(draft.is_pending(EditableField::Price));
        assert!(draft.is_pending(EditableField::Description));

        let session = desk.photo_sessions.current(SUBMITTER).await.unwrap();
        assert_eq!(session.token, result.token);
        assert!(result.replaced_session.is_none());
    }

    #[tokio::test]
    async fn second_submission_replaces_session() {
        let desk = Desk::new();
        let handler = handler(&desk);
        let first = handler.handle(cmd(payload())).await.unwrap();
        let second = handler.handle(cmd(payload())).await.unwrap();
        assert_eq!(second.replaced_session, Some(first.token));
        assert_eq!(
            desk.photo_sessions.current(SUBMITTER).await.unwrap().token,
            second.token
        );
    }

    #[tokio::test]
    async fn invalid_form_creates_nothing() {
        let desk = Desk::new();
        let result = handler(&desk)
            .handle(cmd(json!({"car": "x"}).to_string()))
            .await;
        assert!(matches!(result, Err(ListingError::ValidationFailed { .. })));
        assert_eq!(desk.drafts.len().await, 0);
        assert!(desk.photo_sessions.current(SUBMITTER).await.is_none());
    }

    #[tokio::test]
    async fn non_member_is_refused() {
        let desk = Desk::new();
        desk.transport
            .set_member_status(CHANNEL, SUBMITTER, MemberStatus::Left);
        let result = handler(&desk).handle(cmd(payload())).await;
        assert_eq!(result.unwrap_err(), ListingError::NotEligible);
        assert_eq!(desk.drafts.len().await, 0);
    }
}
