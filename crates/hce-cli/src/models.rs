use hce_core::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoundaryEvent {
    Choices,
    Input,
    Idle,
}

/// What the assistant settled on after running to its next stop.
#[derive(Debug, Clone)]
pub(crate) struct BoundaryResult {
    pub(crate) event: BoundaryEvent,
    pub(crate) messages: Vec<Message>,
    pub(crate) choices: Vec<(usize, String)>,
    pub(crate) navigations: Vec<String>,
    pub(crate) file_upload: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TuiCommandAction {
    NotHandled,
    Continue,
    Quit,
}
