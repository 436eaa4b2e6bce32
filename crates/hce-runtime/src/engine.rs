mod handlers;
mod lifecycle;
mod reveal;
mod shell;
mod timers;

pub use lifecycle::{
    AssistantEffect, ChatAssistant, ChatAssistantOptions, CONTEXT_PROJECT_KEY, CONTEXT_USER_KEY,
};

#[cfg(test)]
mod handlers_tests;
