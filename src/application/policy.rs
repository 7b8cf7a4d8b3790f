//! Desk policy - static moderation settings resolved from configuration.

use std::collections::BTreeSet;

use crate::domain::foundation::ChatId;
use crate::domain::listing::{EditableField, ListingForm, PublicContact};

/// Settings the handlers consult but never change.
#[derive(Debug, Clone, Default)]
pub struct DeskPolicy {
    /// Categories whose price waits for a moderator. `None` means all.
    pub price_review_categories: Option<BTreeSet<String>>,
    /// Channel used when reference data names no destination or required channel.
    pub fallback_channel: Option<ChatId>,
    /// Contact printed on public posts instead of the submitter's phone.
    pub public_contact: Option<PublicContact>,
}

impl DeskPolicy {
    pub fn requires_price_review(&self, category: &str) -> bool {
        match &self.price_review_categories {
            None => true,
            Some(categories) => categories.contains(category.trim()),
        }
    }

    /// Fields hidden from the public post until a moderator acts.
    pub fn initial_pending(&self, form: &ListingForm) -> BTreeSet<EditableField> {
        let mut pending = BTreeSet::from([EditableField::Description]);
        if self.requires_price_review(form.category()) {
            pending.insert(EditableField::Price);
        }
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::fixtures::valid_form;

    #[test]
    fn unconfigured_policy_reviews_every_price() {
        let policy = DeskPolicy::default();
        assert!(policy.requires_price_review("anything"));
        let pending = policy.initial_pending(&valid_form());
        assert!(pending.contains(&EditableField::Price));
        assert!(pending.contains(&EditableField::Description));
    }

    #[test]
    fn listed_categories_only() {
        let policy = DeskPolicy {
            price_review_categories: Some(BTreeSet::from(["auction".to_string()])),
            ..Default::default()
        };
        assert!(policy.requires_price_review(" auction "));
        assert!(!policy.requires_price_review("sale"));
    }

    #[test]
    fn description_is_always_pending() {
        let policy = DeskPolicy {
            price_review_categories: Some(BTreeSet::new()),
            ..Default::default()
        };
        let pending = policy.initial_pending(&valid_form());
        assert_eq!(pending, BTreeSet::from([EditableField::Description]));
    }
}
