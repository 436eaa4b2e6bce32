use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hce_core::{AssistantError, SessionSnapshot, SessionState, SESSION_SNAPSHOT_SCHEMA};
use log::{error, warn};

/// A single namespaced key of durable client-side storage.
pub trait SessionStore {
    fn read(&self) -> Result<Option<String>, AssistantError>;
    fn write(&self, payload: &str) -> Result<(), AssistantError>;
    fn remove(&self) -> Result<(), AssistantError>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RefCell<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(payload.into())),
        }
    }

    pub fn payload(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> Result<Option<String>, AssistantError> {
        Ok(self.slot.borrow().clone())
    }

    fn write(&self, payload: &str) -> Result<(), AssistantError> {
        *self.slot.borrow_mut() = Some(payload.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), AssistantError> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}

/// Stores the key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self) -> Result<Option<String>, AssistantError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(AssistantError::new("STORE_READ", source.to_string())),
        }
    }

    fn write(&self, payload: &str) -> Result<(), AssistantError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .map_err(|source| AssistantError::new("STORE_WRITE", source.to_string()))?;
        fs::write(&self.path, payload)
            .map_err(|source| AssistantError::new("STORE_WRITE", source.to_string()))
    }

    fn remove(&self) -> Result<(), AssistantError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(AssistantError::new("STORE_REMOVE", source.to_string())),
        }
    }
}

/// Unreadable, unparseable or foreign-schema data is erased and reported as absent.
pub fn load_snapshot(store: &dyn SessionStore) -> Option<SessionSnapshot> {
    let raw = match store.read() {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(error) => {
            warn!("discarding stored session: {}", error);
            return None;
        }
    };

    let snapshot = match serde_json::from_str::<SessionSnapshot>(&raw) {
        Ok(snapshot) if snapshot.schema_version == SESSION_SNAPSHOT_SCHEMA => snapshot,
        Ok(snapshot) => {
            warn!(
                "discarding stored session with schema {}",
                snapshot.schema_version
            );
            discard(store);
            return None;
        }
        Err(error) => {
            warn!("discarding corrupt stored session: {}", error);
            discard(store);
            return None;
        }
    };

    Some(snapshot)
}

pub fn save_snapshot(store: &dyn SessionStore, state: &SessionState, max_messages: usize) {
    let snapshot = SessionSnapshot::capture(state, max_messages);
    let result = serde_json::to_string(&snapshot)
        .map_err(|source| AssistantError::new("STORE_ENCODE", source.to_string()))
        .and_then(|payload| store.write(&payload));
    if let Err(error) = result {
        error!("failed to persist session: {}", error);
        discard(store);
    }
}

pub fn clear_snapshot(store: &dyn SessionStore) {
    discard(store);
}

fn discard(store: &dyn SessionStore) {
    if let Err(error) = store.remove() {
        error!("failed to erase stored session: {}", error);
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;
    use hce_core::MessageDraft;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("hce-assistant-{}-{}", name, nanos))
    }

    fn sample_state() -> SessionState {
        let mut state = SessionState::fresh("start");
        state.push_message(MessageDraft::bot_text("Olá"), "09:00".into());
        state.push_message(MessageDraft::user_text("Ana"), "09:01".into());
        state.node_id = "ask_project".to_string();
        state
            .bindings
            .insert("userName".to_string(), "Ana".to_string());
        state.history.push("start".to_string());
        state.history_marks.push(1);
        state
            .context
            .insert("userName".to_string(), "Ana".to_string());
        state
    }

    #[test]
    fn memory_store_round_trips_a_snapshot() {
        let store = MemorySessionStore::new();
        let state = sample_state();
        save_snapshot(&store, &state, 100);

        let loaded = load_snapshot(&store).expect("snapshot should load");
        assert_eq!(loaded.into_state(), state);
    }

    #[test]
    fn corrupt_payload_is_discarded() {
        let store = MemorySessionStore::with_payload("{not json");
        assert!(load_snapshot(&store).is_none());
        assert!(store.payload().is_none());
    }

    #[test]
    fn foreign_schema_is_discarded() {
        let store = MemorySessionStore::new();
        let mut snapshot = SessionSnapshot::capture(&sample_state(), 100);
        snapshot.schema_version = "other.v9".to_string();
        store
            .write(&serde_json::to_string(&snapshot).expect("snapshot json"))
            .expect("write should pass");

        assert!(load_snapshot(&store).is_none());
        assert!(store.payload().is_none());
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = temp_path("file-store");
        let store = FileSessionStore::new(&dir, "hceChatState");
        assert!(store.path().ends_with("hceChatState.json"));
        assert!(load_snapshot(&store).is_none());

        let state = sample_state();
        save_snapshot(&store, &state, 100);
        assert!(store.path().exists());
        let loaded = load_snapshot(&store).expect("snapshot should load");
        assert_eq!(loaded.bindings.get("userName").map(String::as_str), Some("Ana"));

        clear_snapshot(&store);
        assert!(!store.path().exists());
        clear_snapshot(&store);
    }
}
