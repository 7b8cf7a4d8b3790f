//! Reference-data snapshot shared by the file and in-memory adapters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{ChatId, UserId};
use crate::ports::SequenceNumber;

/// Seed values applied on top of whatever was stored before.
#[derive(Debug, Clone, Default)]
pub struct ReferenceBootstrap {
    pub owner_id: Option<UserId>,
    pub admin_ids: Vec<UserId>,
    /// Added to the required, allowed and destination lists.
    pub target_channel_id: Option<ChatId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RequiredChannel {
    pub id: ChatId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Destination {
    pub id: ChatId,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Destinations {
    #[serde(default)]
    pub list: Vec<Destination>,
    #[serde(default)]
    pub active: Option<ChatId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Counter {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub num: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ReferenceState {
    pub owner_id: Option<UserId>,
    pub admins: BTreeSet<UserId>,
    pub required: Vec<RequiredChannel>,
    pub allowed: BTreeSet<ChatId>,
    pub destinations: Destinations,
    pub counter: Counter,
}

impl ReferenceState {
    /// Merges bootstrap values into stored data.
    pub fn apply(&mut self, bootstrap: &ReferenceBootstrap) {
        self.owner_id = bootstrap.owner_id;
        self.admins.extend(bootstrap.admin_ids.iter().copied());
        if let Some(owner) = bootstrap.owner_id {
            self.admins.insert(owner);
        }
        if let Some(channel) = bootstrap.target_channel_id {
            if !self.required.iter().any(|c| c.id == channel) {
                self.required.push(RequiredChannel {
                    id: channel,
                    title: String::new(),
                    username: String::new(),
                });
            }
            self.allowed.insert(channel);
            if !self.destinations.list.iter().any(|d| d.id == channel) {
                self.destinations.list.push(Destination {
                    id: channel,
                    title: String::new(),
                });
            }
            if self.destinations.active.is_none() {
                self.destinations.active = Some(channel);
            }
        }
    }

    pub fn moderators(&self) -> Vec<UserId> {
        self.admins.iter().copied().collect()
    }

    pub fn is_moderator(&self, user_id: UserId) -> bool {
        self.admins.contains(&user_id)
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_id == Some(user_id)
    }

    pub fn required_ids(&self) -> Vec<ChatId> {
        self.required.iter().map(|c| c.id).collect()
    }

    /// Advances the global counter; the number never resets.
    pub fn next_sequence(&mut self, today: NaiveDate) -> SequenceNumber {
        self.counter.num += 1;
        self.counter.date = Some(today);
        SequenceNumber {
            number: self.counter.num,
            date: today,
        }
    }
}
