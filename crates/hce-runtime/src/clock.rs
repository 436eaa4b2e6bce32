use chrono::Local;

/// Produces the human-readable timestamp attached to each message.
pub trait WallClock {
    fn label(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalWallClock;

impl WallClock for LocalWallClock {
    fn label(&self) -> String {
        Local::now().format("%H:%M").to_string()
    }
}

#[derive(Debug, Clone)]
pub struct FixedWallClock {
    label: String,
}

impl FixedWallClock {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl WallClock for FixedWallClock {
    fn label(&self) -> String {
        self.label.clone()
    }
}
