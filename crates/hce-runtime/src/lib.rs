mod clock;
mod engine;
mod helpers;
mod store;

pub use clock::{FixedWallClock, LocalWallClock, WallClock};
pub use engine::{
    AssistantEffect, ChatAssistant, ChatAssistantOptions, CONTEXT_PROJECT_KEY, CONTEXT_USER_KEY,
};
pub use helpers::file_check::{mime_from_path, validate_file, FileCandidate};
pub use helpers::text::{build_deep_link, interpolate};
pub use store::{
    clear_snapshot, load_snapshot, save_snapshot, FileSessionStore, MemorySessionStore,
    SessionStore,
};
