//! Dispatcher - routes inbound platform events to handlers.
//!
//! Every handler outcome is reported back to the acting user: callback
//! presses get a toast (an alert on failure), everything else a private
//! message. No error escapes `dispatch`.

use std::sync::Arc;
use tracing::{debug, error, warn};

use super::handlers::{
    ApplyEditCommand, ApplyEditHandler, ApplyEditResult, ApproveCommand, ApproveHandler,
    BeginEditCommand, BeginEditHandler, FinalizeCommand, FinalizeHandler, FinalizeResult,
    RejectCommand, RejectHandler, SubmitFormCommand, SubmitFormHandler, UploadPhotoCommand,
    UploadPhotoHandler, UploadPhotoResult,
};
use super::policy::DeskPolicy;
use super::services::{MembershipGate, ModeratorFanout, PublishPipeline};
use super::sessions::{EditIntents, PhotoCollectionSessions};
use crate::domain::draft::MAX_PHOTOS;
use crate::domain::foundation::{ChatId, PhotoRef, UserId};
use crate::domain::listing::text::to_persian_digits;
use crate::domain::listing::{EditableField, ListingError};
use crate::domain::moderation::{finish_controls, CallbackAction, InlineKeyboard};
use crate::ports::{Clock, DraftStore, MessageRef, MessagingTransport, ReferenceData};

const FORM_SAVED_TEXT: &str =
    "✅ فرم شما ذخیره شد.\nاکنون می‌توانید حداکثر ۵ عکس بفرستید، سپس «📣 انتشار در گروه» را بزنید.";
const PHOTO_LIMIT_TEXT: &str = "حداکثر ۵ عکس مجاز است. «📣 انتشار در گروه» را بزنید.";
const SUBMITTED_TEXT: &str = "✅ آگهی شما ثبت شد و پس از بررسی ادمین تکمیل می‌شود.";
const ALREADY_SUBMITTED_TEXT: &str = "این آگهی قبلاً ثبت شده است.";
const DESCRIPTION_UPDATED_TEXT: &str = "✅ توضیحات به‌روزرسانی شد.";
const APPROVED_TEXT: &str = "✅ روی پست گروه اعمال شد.";
const REJECTED_TEXT: &str = "❌ آگهی رد شد.";
const UNKNOWN_BUTTON_TEXT: &str = "دکمه نامعتبر است.";

/// How a button press is acknowledged.
enum ButtonOutcome {
    Toast(&'static str),
    /// Acknowledge, then send the prompt as a private message.
    Prompt(&'static str),
    /// The finish button did its job and should disappear.
    Submitted(&'static str),
}

/// Who triggered an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub handle: Option<String>,
}

impl Actor {
    pub fn new(id: UserId) -> Self {
        Self { id, handle: None }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    /// Private chat with the actor.
    pub fn chat_id(&self) -> ChatId {
        ChatId::from(self.id)
    }
}

/// Platform-independent inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    FormSubmitted {
        actor: Actor,
        chat_id: ChatId,
        payload: String,
    },
    PhotoReceived {
        actor: Actor,
        chat_id: ChatId,
        photo: PhotoRef,
    },
    TextReceived {
        actor: Actor,
        chat_id: ChatId,
        text: String,
    },
    ButtonPressed {
        actor: Actor,
        callback_id: String,
        data: String,
        /// Message that carried the button.
        message: Option<MessageRef>,
    },
}

/// Collaborators the desk is assembled from.
pub struct DeskDependencies {
    pub transport: Arc<dyn MessagingTransport>,
    pub reference: Arc<dyn ReferenceData>,
    pub drafts: Arc<dyn DraftStore>,
    pub clock: Arc<dyn Clock>,
    pub policy: DeskPolicy,
}

pub struct Dispatcher {
    transport: Arc<dyn MessagingTransport>,
    photo_sessions: Arc<PhotoCollectionSessions>,
    intents: Arc<EditIntents>,
    submit_form: SubmitFormHandler,
    upload_photo: UploadPhotoHandler,
    finalize: FinalizeHandler,
    begin_edit: BeginEditHandler,
    apply_edit: ApplyEditHandler,
    approve: ApproveHandler,
    reject: RejectHandler,
}

impl Dispatcher {
    /// Wires every service and handler around the given ports.
    pub fn new(deps: DeskDependencies) -> Self {
        let DeskDependencies {
            transport,
            reference,
            drafts,
            clock,
            policy,
        } = deps;
        let policy = Arc::new(policy);

        let photo_sessions = Arc::new(PhotoCollectionSessions::new(clock.clone()));
        let intents = Arc::new(EditIntents::new(clock));
        let gate = Arc::new(MembershipGate::new(
            transport.clone(),
            reference.clone(),
            policy.fallback_channel,
        ));
        let pipeline = Arc::new(PublishPipeline::new(
            transport.clone(),
            reference.clone(),
            policy.public_contact.clone(),
        ));
        let fanout = Arc::new(ModeratorFanout::new(
            transport.clone(),
            reference.clone(),
            drafts.clone(),
        ));

        Self {
            submit_form: SubmitFormHandler::new(
                gate.clone(),
                drafts.clone(),
                photo_sessions.clone(),
                policy.clone(),
            ),
            upload_photo: UploadPhotoHandler::new(gate, drafts.clone(), photo_sessions.clone()),
            finalize: FinalizeHandler::new(
                drafts.clone(),
                reference.clone(),
                pipeline.clone(),
                fanout.clone(),
                photo_sessions.clone(),
                policy,
            ),
            begin_edit: BeginEditHandler::new(reference.clone(), drafts.clone(), intents.clone()),
            apply_edit: ApplyEditHandler::new(
                reference.clone(),
                drafts.clone(),
                intents.clone(),
                fanout.clone(),
            ),
            approve: ApproveHandler::new(
                reference.clone(),
                drafts.clone(),
                pipeline.clone(),
                fanout.clone(),
                intents.clone(),
            ),
            reject: RejectHandler::new(
                reference,
                drafts,
                pipeline,
                fanout,
                intents.clone(),
                photo_sessions.clone(),
            ),
            transport,
            photo_sessions,
            intents,
        }
    }

    pub fn photo_sessions(&self) -> Arc<PhotoCollectionSessions> {
        self.photo_sessions.clone()
    }

    pub fn intents(&self) -> Arc<EditIntents> {
        self.intents.clone()
    }

    pub async fn dispatch(&self, event: InboundEvent) {
        match event {
            InboundEvent::FormSubmitted {
                actor,
                chat_id,
                payload,
            } => self.on_form(actor, chat_id, payload).await,
            InboundEvent::PhotoReceived {
                actor,
                chat_id,
                photo,
            } => self.on_photo(actor, chat_id, photo).await,
            InboundEvent::TextReceived {
                actor,
                chat_id,
                text,
            } => self.on_text(actor, chat_id, text).await,
            InboundEvent::ButtonPressed {
                actor,
                callback_id,
                data,
                message,
            } => self.on_button(actor, callback_id, data, message).await,
        }
    }

    async fn on_form(&self, actor: Actor, chat_id: ChatId, payload: String) {
        let cmd = SubmitFormCommand {
            submitter_id: actor.id,
            submitter_handle: actor.handle.clone(),
            payload,
        };
        match self.submit_form.handle(cmd).await {
            Ok(result) => {
                let controls = finish_controls(&result.token);
                self.reply(chat_id, FORM_SAVED_TEXT, Some(&controls)).await;
            }
            Err(e) => self.report(&actor, chat_id, "submit_form", &e).await,
        }
    }

    async fn on_photo(&self, actor: Actor, chat_id: ChatId, photo: PhotoRef) {
        let cmd = UploadPhotoCommand {
            submitter_id: actor.id,
            photo,
        };
        match self.upload_photo.handle(cmd).await {
            Ok(UploadPhotoResult::Accepted { token, remaining }) => {
                let text = if remaining == 0 {
                    format!(
                        "📸 عکس دریافت شد. ظرفیت {} عکس تکمیل است؛ «📣 انتشار در گروه» را بزنید.",
                        to_persian_digits(&MAX_PHOTOS.to_string())
                    )
                } else {
                    format!(
                        "📸 عکس دریافت شد. {} عکس دیگر می‌توانید بفرستید.",
                        to_persian_digits(&remaining.to_string())
                    )
                };
                self.reply(chat_id, &text, Some(&finish_controls(&token)))
                    .await;
            }
            Ok(UploadPhotoResult::LimitReached { token, .. }) => {
                self.reply(chat_id, PHOTO_LIMIT_TEXT, Some(&finish_controls(&token)))
                    .await;
            }
            Ok(UploadPhotoResult::Ignored) => {
                debug!(user = %actor.id, "photo outside a collection session");
            }
            Err(e) => self.report(&actor, chat_id, "upload_photo", &e).await,
        }
    }

    async fn on_text(&self, actor: Actor, chat_id: ChatId, text: String) {
        let cmd = ApplyEditCommand {
            moderator_id: actor.id,
            text,
        };
        match self.apply_edit.handle(cmd).await {
            Ok(ApplyEditResult::NoIntent) => {}
            Ok(ApplyEditResult::Applied { field, draft, .. }) => {
                let text = match field {
                    EditableField::Price => {
                        format!("✅ قیمت به‌روزرسانی شد: {}", draft.form().price_words())
                    }
                    EditableField::Description => DESCRIPTION_UPDATED_TEXT.to_string(),
                };
                self.reply(chat_id, &text, None).await;
            }
            Err(e) => self.report(&actor, chat_id, "apply_edit", &e).await,
        }
    }

    async fn on_button(
        &self,
        actor: Actor,
        callback_id: String,
        data: String,
        message: Option<MessageRef>,
    ) {
        let action: CallbackAction = match data.parse() {
            Ok(action) => action,
            Err(_) => {
                debug!(user = %actor.id, %data, "unknown callback payload");
                self.toast(&callback_id, UNKNOWN_BUTTON_TEXT, true).await;
                return;
            }
        };

        let outcome = match action {
            CallbackAction::Finish(token) => self
                .finalize
                .handle(FinalizeCommand {
                    submitter_id: actor.id,
                    token,
                })
                .await
                .map(|result| match result {
                    FinalizeResult::Published { .. } => ButtonOutcome::Submitted(SUBMITTED_TEXT),
                    FinalizeResult::AlreadySubmitted => {
                        ButtonOutcome::Submitted(ALREADY_SUBMITTED_TEXT)
                    }
                }),
            CallbackAction::Edit(field, token) => self
                .begin_edit
                .handle(BeginEditCommand {
                    moderator_id: actor.id,
                    token,
                    field,
                })
                .await
                .map(|result| ButtonOutcome::Prompt(result.intent.prompt())),
            CallbackAction::Publish(token) => self
                .approve
                .handle(ApproveCommand {
                    moderator_id: actor.id,
                    token,
                })
                .await
                .map(|_| ButtonOutcome::Toast(APPROVED_TEXT)),
            CallbackAction::Reject(token) => self
                .reject
                .handle(RejectCommand {
                    moderator_id: actor.id,
                    token,
                })
                .await
                .map(|_| ButtonOutcome::Toast(REJECTED_TEXT)),
        };

        match outcome {
            Ok(ButtonOutcome::Toast(text)) => self.toast(&callback_id, text, false).await,
            Ok(ButtonOutcome::Prompt(prompt)) => {
                self.ack(&callback_id).await;
                self.reply(actor.chat_id(), prompt, None).await;
            }
            Ok(ButtonOutcome::Submitted(text)) => {
                self.toast(&callback_id, text, false).await;
                if let Some(pressed) = message {
                    self.retire_finish_controls(pressed, text).await;
                }
            }
            Err(e) => {
                log_failure(&actor, "callback", &e);
                self.toast(&callback_id, &e.message(), true).await;
            }
        }
    }

    /// Replaces the "form saved" prompt so its finish button cannot be reused.
    async fn retire_finish_controls(&self, pressed: MessageRef, text: &str) {
        if let Err(e) = self
            .transport
            .edit_message_text(pressed.chat_id, pressed.message_id, text, None)
            .await
        {
            debug!(chat = %pressed.chat_id, error = %e, "finish prompt left as is");
        }
    }

    async fn reply(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) {
        if let Err(e) = self.transport.send_message(chat_id, text, keyboard).await {
            warn!(chat = %chat_id, error = %e, "reply not delivered");
        }
    }

    async fn toast(&self, callback_id: &str, text: &str, alert: bool) {
        if let Err(e) = self
            .transport
            .answer_callback(callback_id, Some(text), alert)
            .await
        {
            warn!(callback = callback_id, error = %e, "callback answer failed");
        }
    }

    async fn ack(&self, callback_id: &str) {
        if let Err(e) = self.transport.answer_callback(callback_id, None, false).await {
            warn!(callback = callback_id, error = %e, "callback answer failed");
        }
    }

    async fn report(&self, actor: &Actor, chat_id: ChatId, action: &str, err: &ListingError) {
        log_failure(actor, action, err);
        self.reply(chat_id, &err.message(), None).await;
    }
}

fn log_failure(actor: &Actor, action: &str, err: &ListingError) {
    match err {
        ListingError::Transport(_) | ListingError::Infrastructure(_) => {
            error!(user = %actor.id, action, code = %err.code(), error = %err, "handler failed");
        }
        _ => {
            warn!(user = %actor.id, action, code = %err.code(), error = %err, "action refused");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::{ManualClock, SequentialTokenGenerator};
    use crate::adapters::drafts::InMemoryDraftStore;
    use crate::adapters::reference::{InMemoryReferenceData, ReferenceBootstrap};
    use crate::adapters::telegram::{RecordingTransport, TransportCall};
    use crate::application::test_support::{photo, ADMIN, CHANNEL, OWNER, SUBMITTER};
    use serde_json::json;

    struct Fixture {
        transport: RecordingTransport,
        drafts: Arc<InMemoryDraftStore>,
        dispatcher: Dispatcher,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::default());
        let transport = RecordingTransport::new();
        let reference = InMemoryReferenceData::new(clock.clone()).with_bootstrap(
            &ReferenceBootstrap {
                owner_id: Some(OWNER),
                admin_ids: vec![ADMIN],
                target_channel_id: Some(CHANNEL),
            },
        );
        let drafts = Arc::new(InMemoryDraftStore::new(
            clock.clone(),
            Arc::new(SequentialTokenGenerator::new()),
        ));
        let dispatcher = Dispatcher::new(DeskDependencies {
            transport: Arc::new(transport.clone()),
            reference: Arc::new(reference),
            drafts: drafts.clone(),
            clock,
            policy: DeskPolicy::default(),
        });
        Fixture {
            transport,
            drafts,
            dispatcher,
        }
    }

    fn submitter() -> Actor {
        Actor::new(SUBMITTER).with_handle("seller")
    }

    fn form_event(payload: String) -> InboundEvent {
        InboundEvent::FormSubmitted {
            actor: submitter(),
            chat_id: submitter().chat_id(),
            payload,
        }
    }

    fn valid_payload() -> String {
        json!({
            "category": "sale", "car": "پژو 206", "year": "1398", "color": "سفید",
            "km": "120000", "insurance": "", "gear": "دستی", "desc": "",
            "phone": "09121234567", "million_price": "80"
        })
        .to_string()
    }

    fn press(actor: Actor, data: &str) -> InboundEvent {
        InboundEvent::ButtonPressed {
            actor,
            callback_id: "cb".to_string(),
            data: data.to_string(),
            message: None,
        }
    }

    fn answers(transport: &RecordingTransport) -> Vec<(Option<String>, bool)> {
        transport
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::AnswerCallback {
                    text, show_alert, ..
                } => Some((text, show_alert)),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn form_reply_carries_finish_button() {
        let f = fixture();
        f.dispatcher.dispatch(form_event(valid_payload())).await;

        let sends = f.transport.sends_to(submitter().chat_id());
        assert!(matches!(
            sends.as_slice(),
            [TransportCall::SendMessage { text, keyboard: Some(k), .. }]
                if text == FORM_SAVED_TEXT && k.payloads().any(|p| p == "finish:t1")
        ));
    }

    #[tokio::test]
    async fn invalid_form_is_reported_privately() {
        let f = fixture();
        f.dispatcher.dispatch(form_event("{}".to_string())).await;
        let texts = f.transport.texts_to(submitter().chat_id());
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("اطلاعات نامعتبر است"));
        assert_eq!(f.drafts.len().await, 0);
    }

    #[tokio::test]
    async fn stray_photo_is_silently_dropped() {
        let f = fixture();
        f.dispatcher
            .dispatch(InboundEvent::PhotoReceived {
                actor: submitter(),
                chat_id: submitter().chat_id(),
                photo: photo(0),
            })
            .await;
        assert!(f.transport.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_button_gets_alert() {
        let f = fixture();
        f.dispatcher.dispatch(press(submitter(), "bogus")).await;
        assert_eq!(
            answers(&f.transport),
            vec![(Some(UNKNOWN_BUTTON_TEXT.to_string()), true)]
        );
    }

    #[tokio::test]
    async fn forbidden_approve_is_alerted() {
        let f = fixture();
        f.dispatcher.dispatch(press(submitter(), "publish:t1")).await;
        assert_eq!(
            answers(&f.transport),
            vec![(Some(ListingError::Forbidden.message()), true)]
        );
    }

    #[tokio::test]
    async fn edit_button_prompts_moderator() {
        let f = fixture();
        f.dispatcher.dispatch(form_event(valid_payload())).await;
        f.transport.clear_calls();

        f.dispatcher
            .dispatch(press(Actor::new(ADMIN), "edit_price:t1"))
            .await;
        assert_eq!(answers(&f.transport), vec![(None, false)]);
        let prompts = f.transport.texts_to(ChatId::from(ADMIN));
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("120.5"));
        assert!(f.dispatcher.intents().current(ADMIN).await.is_some());
    }

    #[tokio::test]
    async fn finish_posts_and_acknowledges() {
        let f = fixture();
        f.dispatcher.dispatch(form_event(valid_payload())).await;
        f.dispatcher.dispatch(press(submitter(), "finish:t1")).await;
        f.dispatcher.dispatch(press(submitter(), "finish:t1")).await;

        assert_eq!(f.transport.sends_to(CHANNEL).len(), 1);
        assert_eq!(
            answers(&f.transport),
            vec![
                (Some(SUBMITTED_TEXT.to_string()), false),
                (Some(ALREADY_SUBMITTED_TEXT.to_string()), false),
            ]
        );
        assert!(f.dispatcher.photo_sessions().current(SUBMITTER).await.is_none());
    }
}
