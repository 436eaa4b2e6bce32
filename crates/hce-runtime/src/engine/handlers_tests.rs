use std::rc::Rc;

use hce_core::{AssistantConfig, BackRemoval, Sender};

use super::engine_test_support::*;
use super::*;
use crate::{FileCandidate, MemorySessionStore};

const MIB: u64 = 1024 * 1024;

fn at_project_question() -> (ChatAssistant, Rc<MemorySessionStore>) {
    let (mut assistant, store) = opened_demo_assistant();
    assistant.select_option_at(0).expect("quote option");
    assistant.run_until_idle();
    assert!(assistant.submit_text("Ana"));
    assistant.run_until_idle();
    (assistant, store)
}

#[test]
fn selecting_an_option_strips_options_pushes_history_and_echoes_text() {
    let (mut assistant, _store) = opened_demo_assistant();
    let log_before = assistant.messages().len();
    let option = assistant.active_options().expect("start options")[0].clone();

    assistant.select_option(&option);

    assert!(assistant
        .messages()
        .iter()
        .all(|message| message.options.is_none()));
    assert_eq!(assistant.history(), &["start".to_string()]);
    assert_eq!(assistant.messages().len(), log_before + 1);
    let echoed = assistant.messages().last().expect("user message");
    assert_eq!(echoed.sender, Sender::User);
    assert_eq!(echoed.text.as_deref(), Some("Solicitar orçamento"));
    assert_eq!(assistant.node_id(), "ask_name");
    assert!(assistant.is_typing());
}

#[test]
fn select_option_at_reports_missing_or_out_of_range_choices() {
    let (mut assistant, _store) = opened_demo_assistant();
    let error = assistant
        .select_option_at(9)
        .expect_err("index should be out of range");
    assert_eq!(error.code, "CHOICE_INDEX");

    assistant.select_option_at(0).expect("quote option");
    let error = assistant
        .select_option_at(0)
        .expect_err("options were stripped");
    assert_eq!(error.code, "NO_PENDING_CHOICE");
}

#[test]
fn text_submission_is_ignored_where_no_answer_is_expected() {
    let (mut assistant, _store) = opened_demo_assistant();
    let before = assistant.state().clone();

    assert!(!assistant.submit_text("oi"));
    assert_eq!(assistant.state(), &before);
}

#[test]
fn blank_text_is_ignored() {
    let (mut assistant, _store) = opened_demo_assistant();
    assistant.select_option_at(0).expect("quote option");
    assistant.run_until_idle();
    let before = assistant.state().clone();

    assert!(!assistant.submit_text("   "));
    assert_eq!(assistant.state(), &before);
}

#[test]
fn text_answers_are_trimmed_stored_and_mirrored_into_context() {
    let (mut assistant, _store) = at_project_question();
    assert_eq!(
        assistant.bindings().get("userName").map(String::as_str),
        Some("Ana")
    );
    assert_eq!(
        assistant.context().get(CONTEXT_USER_KEY).map(String::as_str),
        Some("Ana")
    );

    assert!(assistant.submit_text("  Porta pivotante  "));
    assert_eq!(
        assistant.bindings().get("projectInfo").map(String::as_str),
        Some("Porta pivotante")
    );
    assert_eq!(
        assistant
            .context()
            .get(CONTEXT_PROJECT_KEY)
            .map(String::as_str),
        Some("Porta pivotante")
    );
    assert_eq!(
        assistant.messages().last().and_then(|m| m.text.as_deref()),
        Some("Porta pivotante")
    );
    assert_eq!(
        assistant.history(),
        &[
            "start".to_string(),
            "ask_name".to_string(),
            "ask_project".to_string()
        ]
    );
    assert_eq!(assistant.node_id(), "handoff");
}

#[test]
fn oversized_files_are_rejected_without_state_change() {
    let (mut assistant, _store) = at_project_question();
    let before = assistant.state().clone();

    let error = assistant
        .submit_file(&FileCandidate::new("obra.jpg", 15 * MIB, "image/jpeg"))
        .expect_err("15 MiB should be rejected");
    assert_eq!(error.code, "FILE_TOO_LARGE");
    assert_eq!(assistant.state(), &before);
}

#[test]
fn disallowed_file_types_are_rejected_without_state_change() {
    let (mut assistant, _store) = at_project_question();
    let before = assistant.state().clone();

    let error = assistant
        .submit_file(&FileCandidate::new(
            "setup.exe",
            MIB,
            "application/x-msdownload",
        ))
        .expect_err("exe should be rejected");
    assert_eq!(error.code, "FILE_TYPE_UNSUPPORTED");
    assert_eq!(assistant.state(), &before);
}

#[test]
fn accepted_files_record_only_the_name() {
    let (mut assistant, _store) = at_project_question();

    let accepted = assistant
        .submit_file(&FileCandidate::new("planta.png", MIB, "image/png"))
        .expect("png should be accepted");
    assert!(accepted);
    assert_eq!(
        assistant.bindings().get("file").map(String::as_str),
        Some("planta.png")
    );
    assert_eq!(
        assistant.messages().last().and_then(|m| m.text.as_deref()),
        Some("📎 planta.png")
    );
    assert_eq!(assistant.node_id(), "handoff");
    assert_eq!(assistant.history().last().map(String::as_str), Some("ask_project"));
}

#[test]
fn file_submission_needs_a_loaded_tree() {
    let store = Rc::new(MemorySessionStore::new());
    let mut assistant = assistant_with(None, AssistantConfig::default(), store);
    let accepted = assistant
        .submit_file(&FileCandidate::new("obra.jpg", 15 * MIB, "image/jpeg"))
        .expect("no tree means no validation");
    assert!(!accepted);
}

#[test]
fn back_with_empty_history_changes_nothing() {
    let (mut assistant, _store) = opened_demo_assistant();
    let before = assistant.state().clone();

    assert!(!assistant.can_go_back());
    assert!(!assistant.back());
    assert_eq!(assistant.state(), &before);
    assert_eq!(assistant.next_due_in(), None);
}

#[test]
fn back_pops_one_entry_drops_two_messages_and_replays_the_node() {
    let (mut assistant, _store) = opened_demo_assistant();
    assistant.select_option_at(0).expect("quote option");
    assistant.run_until_idle();
    let log_before = assistant.messages().len();

    assert!(assistant.back());
    assert!(assistant.history().is_empty());
    assert_eq!(assistant.messages().len(), log_before - 2);
    assert_eq!(assistant.node_id(), "start");
    assert!(assistant.is_typing());

    assistant.run_until_idle();
    assert_eq!(assistant.messages().len(), log_before - 2 + 3);
    assert!(assistant.active_options().is_some());
}

#[test]
fn back_keeps_bindings_collected_on_the_undone_node() {
    let (mut assistant, _store) = at_project_question();

    assert!(assistant.back());
    assistant.run_until_idle();

    assert_eq!(assistant.node_id(), "ask_name");
    assert_eq!(
        assistant.bindings().get("userName").map(String::as_str),
        Some("Ana")
    );
}

#[test]
fn back_to_node_entry_removes_exactly_what_the_node_produced() {
    let store = Rc::new(MemorySessionStore::new());
    let config = AssistantConfig {
        back_removal: BackRemoval::ToNodeEntry,
        ..AssistantConfig::default()
    };
    let mut assistant = assistant_with(Some(demo_tree()), config, store);
    assistant.open();
    assistant.run_until_idle();
    assistant.select_option_at(0).expect("quote option");
    assistant.run_until_idle();
    assistant.submit_text("Ana");
    assistant.run_until_idle();

    assert!(assistant.back());
    assert_eq!(
        texts(&assistant).last(),
        Some(&(Sender::User, "Solicitar orçamento".to_string()))
    );
    assistant.run_until_idle();
    assert_eq!(assistant.messages().len(), 5);
    assert_eq!(assistant.node_id(), "ask_name");

    assert!(assistant.back());
    assert!(assistant.messages().is_empty());
    assistant.run_until_idle();
    assert_eq!(assistant.messages().len(), 3);
    assert!(assistant.active_options().is_some());
}

#[test]
fn reset_returns_to_a_fresh_session_and_erases_storage() {
    let (mut assistant, store) = at_project_question();
    assistant.flush();
    assert!(store.payload().is_some());

    assistant.reset();

    assert!(assistant.messages().is_empty());
    assert_eq!(assistant.node_id(), "start");
    assert!(assistant.bindings().is_empty());
    assert!(assistant.history().is_empty());
    assert!(assistant.context().is_empty());
    assert!(store.payload().is_none());

    assistant.run_until_idle();
    assert_eq!(assistant.messages().len(), 3);
    assert!(store.payload().is_some());
}

#[test]
fn reset_cancels_the_reveal_in_progress() {
    let (mut assistant, _store) = opened_demo_assistant();
    assistant.select_option_at(1).expect("portfolio option");
    assistant.advance_clock(1_300);

    assistant.reset();
    assistant.run_until_idle();

    assert!(assistant.drain_effects().is_empty());
    assert_eq!(assistant.node_id(), "start");
    assert_eq!(assistant.messages().len(), 3);
}
