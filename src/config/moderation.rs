//! Moderation desk configuration

use serde::Deserialize;
use std::collections::BTreeSet;

use super::error::ValidationError;
use crate::domain::foundation::{ChatId, UserId};
use crate::domain::listing::PublicContact;

/// Who moderates, where listings go and what the public sees
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModerationConfig {
    /// Bot owner; always a moderator
    pub owner_id: Option<i64>,

    /// Additional moderators (comma-separated user ids)
    pub admin_ids: Option<String>,

    /// Default publication channel
    pub target_channel_id: Option<i64>,

    /// Categories whose price needs moderator approval (comma-separated).
    /// When unset every category does.
    pub price_review_categories: Option<String>,

    /// Desk contact printed on public posts
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
}

impl ModerationConfig {
    pub fn owner(&self) -> Option<UserId> {
        self.owner_id.map(UserId::new)
    }

    pub fn target_channel(&self) -> Option<ChatId> {
        self.target_channel_id.map(ChatId::new)
    }

    /// Parse admin ids, skipping blanks
    pub fn admin_id_list(&self) -> Result<Vec<UserId>, ValidationError> {
        comma_list(self.admin_ids.as_deref())
            .into_iter()
            .map(|raw| {
                raw.parse()
                    .map_err(|_| ValidationError::InvalidAdminId(raw.clone()))
            })
            .collect()
    }

    pub fn review_categories(&self) -> Option<BTreeSet<String>> {
        self.price_review_categories
            .as_deref()
            .map(|raw| comma_list(Some(raw)).into_iter().collect())
    }

    pub fn public_contact(&self) -> Option<PublicContact> {
        let phone = self.contact_phone.as_deref().map(str::trim)?;
        if phone.is_empty() {
            return None;
        }
        Some(PublicContact {
            name: self
                .contact_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            phone: phone.to_string(),
        })
    }

    /// Validate moderation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.admin_id_list()?;
        if self.contact_name.is_some() && self.public_contact().is_none() {
            return Err(ValidationError::MissingRequired("MODERATION__CONTACT_PHONE"));
        }
        Ok(())
    }
}

fn comma_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    })
    .unwrap_or_default()
}
