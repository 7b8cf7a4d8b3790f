//! Bot API Client - Implementation of MessagingTransport over HTTPS.
//!
//! Every call is a JSON `POST` to `{base_url}/bot{token}/{method}`. Text is
//! always sent with the HTML parse mode.
//!
//! # Configuration
//!
//! ```ignore
//! let config = BotApiConfig::new(token)
//!     .with_base_url("https://api.telegram.org")
//!     .with_poll_timeout(Duration::from_secs(30));
//!
//! let client = BotApiClient::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

use super::wire::{ApiResponse, ChatMember, InputMediaPhoto, Message, Update};
use crate::domain::foundation::{ChatId, MessageId, PhotoRef, UserId};
use crate::domain::moderation::InlineKeyboard;
use crate::ports::{MemberStatus, MessageRef, MessagingTransport, TransportError};

const PARSE_MODE: &str = "HTML";

/// Edits that change nothing are reported with this description.
const NOT_MODIFIED: &str = "message is not modified";

/// Configuration for the Bot API client.
#[derive(Debug)]
pub struct BotApiConfig {
    token: Secret<String>,
    /// Base URL for the API (default: https://api.telegram.org).
    pub base_url: String,
    /// Timeout for ordinary requests.
    pub request_timeout: Duration,
    /// How long `getUpdates` may hold the connection open.
    pub poll_timeout: Duration,
}

impl BotApiConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Secret::new(token.into()),
            base_url: "https://api.telegram.org".to_string(),
            request_timeout: Duration::from_secs(15),
            poll_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url,
            self.token.expose_secret(),
            method
        )
    }
}

/// HTTPS client for the Bot API.
pub struct BotApiClient {
    config: BotApiConfig,
    client: Client,
}

impl BotApiClient {
    /// # Errors
    /// `Network` if the HTTP client cannot be built.
    pub fn new(config: BotApiConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Issues one API call and unwraps the response envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(self.config.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            // the URL carries the bot token
            .map_err(|e| TransportError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(format!("{}: {}", method, e.without_url())))?;

        if !envelope.ok {
            return Err(TransportError::Api {
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }
        envelope
            .result
            .ok_or_else(|| TransportError::Decode(format!("{}: missing result", method)))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        body: Value,
    ) -> Result<T, TransportError> {
        self.call(method, &body, self.config.request_timeout).await
    }

    /// Edits succeed when the target already shows the requested content.
    async fn edit(&self, method: &str, body: Value) -> Result<(), TransportError> {
        match self.request::<Value>(method, body).await {
            Ok(_) => Ok(()),
            Err(TransportError::Api { description, .. }) if description.contains(NOT_MODIFIED) => {
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Long-polls for updates after `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TransportError> {
        let mut body = json!({
            "timeout": self.config.poll_timeout.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        let timeout = self.config.request_timeout + self.config.poll_timeout;
        self.call("getUpdates", &body, timeout).await
    }
}

fn message_ref(message: &Message) -> MessageRef {
    MessageRef {
        chat_id: ChatId::new(message.chat.id),
        message_id: MessageId::new(message.message_id),
    }
}

fn with_keyboard(mut body: Value, keyboard: Option<&InlineKeyboard>) -> Result<Value, TransportError> {
    if let Some(keyboard) = keyboard {
        body["reply_markup"] =
            serde_json::to_value(keyboard).map_err(|e| TransportError::Decode(e.to_string()))?;
    }
    Ok(body)
}

#[async_trait]
impl MessagingTransport for BotApiClient {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef, TransportError> {
        let body = with_keyboard(
            json!({
                "chat_id": chat_id.get(),
                "text": text,
                "parse_mode": PARSE_MODE,
                "disable_web_page_preview": true,
            }),
            keyboard,
        )?;
        let message: Message = self.request("sendMessage", body).await?;
        Ok(message_ref(&message))
    }

    async fn send_photo_group(
        &self,
        chat_id: ChatId,
        photos: &[PhotoRef],
        caption: &str,
    ) -> Result<Vec<MessageRef>, TransportError> {
        match photos {
            [] => Err(TransportError::Decode(
                "photo group needs at least one photo".to_string(),
            )),
            // albums need two or more items
            [single] => {
                let message: Message = self
                    .request(
                        "sendPhoto",
                        json!({
                            "chat_id": chat_id.get(),
                            "photo": single.as_str(),
                            "caption": caption,
                            "parse_mode": PARSE_MODE,
                        }),
                    )
                    .await?;
                Ok(vec![message_ref(&message)])
            }
            [first, rest @ ..] => {
                let mut media = vec![InputMediaPhoto {
                    kind: "photo",
                    media: first.as_str(),
                    caption: Some(caption),
                    parse_mode: Some(PARSE_MODE),
                }];
                media.extend(rest.iter().map(|photo| InputMediaPhoto {
                    kind: "photo",
                    media: photo.as_str(),
                    caption: None,
                    parse_mode: None,
                }));
                let messages: Vec<Message> = self
                    .request(
                        "sendMediaGroup",
                        json!({ "chat_id": chat_id.get(), "media": media }),
                    )
                    .await?;
                if messages.is_empty() {
                    return Err(TransportError::Decode("empty media group".to_string()));
                }
                Ok(messages.iter().map(message_ref).collect())
            }
        }
    }

    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), TransportError> {
        let body = with_keyboard(
            json!({
                "chat_id": chat_id.get(),
                "message_id": message_id.get(),
                "text": text,
                "parse_mode": PARSE_MODE,
                "disable_web_page_preview": true,
            }),
            keyboard,
        )?;
        self.edit("editMessageText", body).await
    }

    async fn edit_message_caption(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.edit(
            "editMessageCaption",
            json!({
                "chat_id": chat_id.get(),
                "message_id": message_id.get(),
                "caption": caption,
                "parse_mode": PARSE_MODE,
            }),
        )
        .await
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TransportError> {
        let _: bool = self
            .request(
                "deleteMessage",
                json!({ "chat_id": chat_id.get(), "message_id": message_id.get() }),
            )
            .await?;
        Ok(())
    }

    async fn get_chat_member_status(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<MemberStatus, TransportError> {
        let member: ChatMember = self
            .request(
                "getChatMember",
                json!({ "chat_id": chat_id.get(), "user_id": user_id.get() }),
            )
            .await?;
        member.status.parse()
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TransportError> {
        let mut body = json!({
            "callback_query_id": callback_id,
            "show_alert": show_alert,
        });
        if let Some(text) = text {
            body["text"] = json!(text);
        }
        let _: bool = self.request("answerCallbackQuery", body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_embeds_token() {
        let config = BotApiConfig::new("123:abc").with_base_url("http://localhost:8081/");
        assert_eq!(
            config.method_url("getMe"),
            "http://localhost:8081/bot123:abc/getMe"
        );
    }

    #[test]
    fn debug_output_hides_token() {
        let config = BotApiConfig::new("123:secret");
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn keyboard_is_attached_as_reply_markup() {
        use crate::domain::foundation::DraftToken;
        use crate::domain::moderation::finish_controls;

        let token = DraftToken::parse("t1").unwrap();
        let keyboard = finish_controls(&token);
        let body = with_keyboard(json!({"text": "x"}), Some(&keyboard)).unwrap();
        assert_eq!(
            body["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "finish:t1"
        );
        let bare = with_keyboard(json!({"text": "x"}), None).unwrap();
        assert!(bare.get("reply_markup").is_none());
    }

    #[test]
    fn client_builds() {
        assert!(BotApiClient::new(BotApiConfig::new("t")).is_ok());
    }
}
