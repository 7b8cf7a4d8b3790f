//! File-backed Reference Data Adapter
//!
//! Stores the moderator roster, channel lists and the listing counter as
//! small JSON files in one data directory:
//!
//! - `admins.json` - `[user_id, ...]`
//! - `required_channels.json` - `[{"id", "title", "username"}, ...]`
//! - `allowed_channels.json` - `[chat_id, ...]`
//! - `destinations.json` - `{"list": [{"id", "title"}], "active": chat_id}`
//! - `counter.json` - `{"date": "YYYY-MM-DD", "num": n}`
//!
//! Files are read once on open; the counter is written on every allocation.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

use super::state::{Counter, Destinations, ReferenceBootstrap, ReferenceState, RequiredChannel};
use crate::domain::foundation::{ChatId, UserId};
use crate::ports::{Clock, ReferenceData, ReferenceDataError, SequenceNumber};

const ADMINS_FILE: &str = "admins.json";
const REQUIRED_FILE: &str = "required_channels.json";
const ALLOWED_FILE: &str = "allowed_channels.json";
const DESTINATIONS_FILE: &str = "destinations.json";
const COUNTER_FILE: &str = "counter.json";

/// JSON-file reference data rooted at a data directory.
pub struct FileReferenceData {
    base_path: PathBuf,
    state: Mutex<ReferenceState>,
    clock: Arc<dyn Clock>,
}

impl FileReferenceData {
    /// Loads stored data, merges the bootstrap values and writes the result back.
    ///
    /// # Errors
    /// `Io` if the directory cannot be created or written, `Corrupt` if a
    /// file exists but does not parse.
    pub async fn open<P: AsRef<Path>>(
        base_path: P,
        bootstrap: &ReferenceBootstrap,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ReferenceDataError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)
            .await
            .map_err(|e| ReferenceDataError::Io(e.to_string()))?;

        let admins: Vec<UserId> = read_json(&base_path, ADMINS_FILE).await?.unwrap_or_default();
        let required: Vec<RequiredChannel> =
            read_json(&base_path, REQUIRED_FILE).await?.unwrap_or_default();
        let allowed: Vec<ChatId> = read_json(&base_path, ALLOWED_FILE).await?.unwrap_or_default();
        let destinations: Destinations = read_json(&base_path, DESTINATIONS_FILE)
            .await?
            .unwrap_or_default();
        let counter: Counter = read_json(&base_path, COUNTER_FILE).await?.unwrap_or_default();

        let mut state = ReferenceState {
            owner_id: None,
            admins: admins.into_iter().collect(),
            required,
            allowed: allowed.into_iter().collect(),
            destinations,
            counter,
        };
        state.apply(bootstrap);

        let store = Self {
            base_path,
            state: Mutex::new(state),
            clock,
        };
        store.persist_all().await?;
        tracing::info!(
            path = %store.base_path.display(),
            "reference data loaded"
        );
        Ok(store)
    }

    async fn persist_all(&self) -> Result<(), ReferenceDataError> {
        let state = self.state.lock().await;
        let admins: Vec<UserId> = state.admins.iter().copied().collect();
        let allowed: Vec<ChatId> = state.allowed.iter().copied().collect();
        write_json(&self.base_path, ADMINS_FILE, &admins).await?;
        write_json(&self.base_path, REQUIRED_FILE, &state.required).await?;
        write_json(&self.base_path, ALLOWED_FILE, &allowed).await?;
        write_json(&self.base_path, DESTINATIONS_FILE, &state.destinations).await?;
        write_json(&self.base_path, COUNTER_FILE, &state.counter).await
    }
}

async fn read_json<T: DeserializeOwned>(
    base: &Path,
    name: &str,
) -> Result<Option<T>, ReferenceDataError> {
    let path = base.join(name);
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)
        .await
        .map_err(|e| ReferenceDataError::Io(e.to_string()))?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ReferenceDataError::Corrupt {
            file: name.to_string(),
            reason: e.to_string(),
        })
}

/// Writes through a temporary file so a crash never leaves half a file.
async fn write_json<T: Serialize + ?Sized>(
    base: &Path,
    name: &str,
    value: &T,
) -> Result<(), ReferenceDataError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ReferenceDataError::Corrupt {
        file: name.to_string(),
        reason: e.to_string(),
    })?;
    let tmp = base.join(format!("{}.tmp", name));
    fs::write(&tmp, json)
        .await
        .map_err(|e| ReferenceDataError::Io(e.to_string()))?;
    fs::rename(&tmp, base.join(name))
        .await
        .map_err(|e| ReferenceDataError::Io(e.to_string()))
}

#[async_trait]
impl ReferenceData for FileReferenceData {
    async fn list_moderators(&self) -> Result<Vec<UserId>, ReferenceDataError> {
        Ok(self.state.lock().await.moderators())
    }

    async fn is_moderator(&self, user_id: UserId) -> Result<bool, ReferenceDataError> {
        Ok(self.state.lock().await.is_moderator(user_id))
    }

    async fn is_owner(&self, user_id: UserId) -> Result<bool, ReferenceDataError> {
        Ok(self.state.lock().await.is_owner(user_id))
    }

    async fn required_channel_ids(&self) -> Result<Vec<ChatId>, ReferenceDataError> {
        Ok(self.state.lock().await.required_ids())
    }

    async fn is_channel_allowed(&self, chat_id: ChatId) -> Result<bool, ReferenceDataError> {
        Ok(self.state.lock().await.allowed.contains(&chat_id))
    }

    async fn active_destination(&self) -> Result<Option<ChatId>, ReferenceDataError> {
        Ok(self.state.lock().await.destinations.active)
    }

    async fn next_sequence_number(&self) -> Result<SequenceNumber, ReferenceDataError> {
        let today = self.clock.now().date();
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let sequence = next.next_sequence(today);
        write_json(&self.base_path, COUNTER_FILE, &next.counter).await?;
        *state = next;
        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use tempfile::TempDir;

    fn bootstrap() -> ReferenceBootstrap {
        ReferenceBootstrap {
            owner_id: Some(UserId::new(1)),
            admin_ids: vec![UserId::new(2)],
            target_channel_id: Some(ChatId::new(-100)),
        }
    }

    async fn open(dir: &TempDir) -> FileReferenceData {
        FileReferenceData::open(dir.path(), &bootstrap(), Arc::new(ManualClock::default()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn bootstrap_writes_every_file() {
        let dir = TempDir::new().unwrap();
        open(&dir).await;
        for name in [
            ADMINS_FILE,
            REQUIRED_FILE,
            ALLOWED_FILE,
            DESTINATIONS_FILE,
            COUNTER_FILE,
        ] {
            assert!(dir.path().join(name).exists(), "{} missing", name);
        }
    }

    #[tokio::test]
    async fn stored_admins_survive_reopen() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(ADMINS_FILE), "[7, 8]").unwrap();
        let reference = open(&dir).await;
        assert_eq!(
            reference.list_moderators().await.unwrap(),
            vec![UserId::new(1), UserId::new(2), UserId::new(7), UserId::new(8)]
        );
    }

    #[tokio::test]
    async fn counter_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let reference = open(&dir).await;
            assert_eq!(reference.next_sequence_number().await.unwrap().number, 1);
            assert_eq!(reference.next_sequence_number().await.unwrap().number, 2);
        }
        let reference = open(&dir).await;
        assert_eq!(reference.next_sequence_number().await.unwrap().number, 3);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(COUNTER_FILE), "{not json").unwrap();
        let result =
            FileReferenceData::open(dir.path(), &bootstrap(), Arc::new(ManualClock::default()))
                .await;
        assert!(matches!(
            result,
            Err(ReferenceDataError::Corrupt { ref file, .. }) if file == COUNTER_FILE
        ));
    }

    #[tokio::test]
    async fn target_channel_is_allowed_and_active() {
        let dir = TempDir::new().unwrap();
        let reference = open(&dir).await;
        assert!(reference.is_channel_allowed(ChatId::new(-100)).await.unwrap());
        assert_eq!(
            reference.active_destination().await.unwrap(),
            Some(ChatId::new(-100))
        );
        assert_eq!(
            reference.required_channel_ids().await.unwrap(),
            vec![ChatId::new(-100)]
        );
    }
}
