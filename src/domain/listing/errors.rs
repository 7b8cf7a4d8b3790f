//! Listing-workflow error types.

use crate::domain::foundation::{DraftToken, ErrorCode, ValidationError};

/// Errors reported back to the actor of a listing workflow event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    /// Input was malformed; state unchanged.
    ValidationFailed { field: String, message: String },
    /// Draft no longer exists (finalized, swept, or never created).
    NotFound(DraftToken),
    /// Actor lacks the privilege for this action.
    Forbidden,
    /// User is not a member of every required channel.
    NotEligible,
    /// Draft has not been published to the channel yet.
    NotPublished(DraftToken),
    /// No destination channel is configured or allowed.
    DestinationMissing,
    /// The messaging transport failed on an authoritative write.
    Transport(String),
    /// Reference data or another collaborator failed.
    Infrastructure(String),
}

impl ListingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ListingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn not_found(token: DraftToken) -> Self {
        ListingError::NotFound(token)
    }
    pub fn forbidden() -> Self {
        ListingError::Forbidden
    }
    pub fn transport(message: impl Into<String>) -> Self {
        ListingError::Transport(message.into())
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        ListingError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            ListingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ListingError::NotFound(_) => ErrorCode::DraftNotFound,
            ListingError::Forbidden => ErrorCode::Forbidden,
            ListingError::NotEligible => ErrorCode::NotEligible,
            ListingError::NotPublished(_) => ErrorCode::NotPublished,
            ListingError::DestinationMissing => ErrorCode::DestinationMissing,
            ListingError::Transport(_) => ErrorCode::TransportError,
            ListingError::Infrastructure(_) => ErrorCode::StorageError,
        }
    }

    /// User-facing message.
    pub fn message(&self) -> String {
        match self {
            ListingError::ValidationFailed { message, .. } => {
                format!("اطلاعات نامعتبر است: {}", message)
            }
            ListingError::NotFound(_) => "درخواست یافت نشد.".to_string(),
            ListingError::Forbidden => "شما ادمین نیستید.".to_string(),
            ListingError::NotEligible => {
                "⛔ ابتدا در کانال‌های موردنیاز عضو شوید، سپس دوباره اقدام کنید.".to_string()
            }
            ListingError::NotPublished(_) => "اطلاعات پیام کانال یافت نشد.".to_string(),
            ListingError::DestinationMissing => {
                "کانال مقصد در تنظیمات تعریف نشده.".to_string()
            }
            ListingError::Transport(_) => "خطا در ارسال/ادیت پست.".to_string(),
            ListingError::Infrastructure(_) => "خطای داخلی؛ دوباره تلاش کنید.".to_string(),
        }
    }
}

impl std::fmt::Display for ListingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingError::ValidationFailed { field, message } => {
                write!(f, "validation failed for '{}': {}", field, message)
            }
            ListingError::NotFound(token) => write!(f, "draft not found: {}", token),
            ListingError::Forbidden => write!(f, "permission denied"),
            ListingError::NotEligible => write!(f, "membership requirement not met"),
            ListingError::NotPublished(token) => write!(f, "draft not published: {}", token),
            ListingError::DestinationMissing => write!(f, "no destination channel configured"),
            ListingError::Transport(msg) => write!(f, "transport error: {}", msg),
            ListingError::Infrastructure(msg) => write!(f, "infrastructure error: {}", msg),
        }
    }
}

impl std::error::Error for ListingError {}

impl From<ValidationError> for ListingError {
    fn from(err: ValidationError) -> Self {
        ListingError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_taxonomy() {
        let token = DraftToken::new();
        assert_eq!(ListingError::not_found(token.clone()).code(), ErrorCode::DraftNotFound);
        assert_eq!(ListingError::forbidden().code(), ErrorCode::Forbidden);
        assert_eq!(ListingError::NotEligible.code(), ErrorCode::NotEligible);
        assert_eq!(ListingError::NotPublished(token).code(), ErrorCode::NotPublished);
        assert_eq!(ListingError::transport("x").code(), ErrorCode::TransportError);
    }

    #[test]
    fn validation_error_converts_with_field() {
        let err: ListingError = ValidationError::non_latin_digits("price").into();
        assert!(matches!(err, ListingError::ValidationFailed { ref field, .. } if field == "price"));
    }

    #[test]
    fn infrastructure_failures_map_to_storage_code() {
        let err = ListingError::infrastructure("counter file unreadable");
        assert_eq!(err.code(), ErrorCode::StorageError);
        assert_eq!(err.message(), "خطای داخلی؛ دوباره تلاش کنید.");
    }

    #[test]
    fn display_is_developer_facing_and_message_is_user_facing() {
        let err = ListingError::Forbidden;
        assert_eq!(err.to_string(), "permission denied");
        assert_eq!(err.message(), "شما ادمین نیستید.");
    }
}
