// Integration tests for prompt composition
//
// Tests cover:
// - History truncation and ordering
// - Degraded prompts on extractor or store failure
// - Profile rendering and topic hints

mod common;

use common::{FixedSource, UnreachableStore, extractor};
use kgchat::models::memory::MemoryPolicy;
use kgchat::models::profile::ProfileCategory;
use kgchat::models::prompt::{PromptMessage, PromptRole};
use kgchat::models::turn::Role;
use kgchat::services::composer::{NO_PROFILE_INSTRUCTION, PROFILE_RESTRICTION};
use kgchat::services::{ContextComposer, ConversationMemory};
use kgchat::storage::{InMemoryKnowledgeStore, KnowledgeStore};
use std::sync::Arc;
use std::sync::atomic::Ordering;

const PERSONAL_QUERY: &str = r#"{"intent": "request_recommendation", "topic": "Rust", "use_KG": true}"#;

fn composer_with(
    source: Arc<FixedSource>,
    store: Arc<dyn KnowledgeStore>,
) -> (ContextComposer, Arc<ConversationMemory>) {
    let memory = Arc::new(ConversationMemory::default());
    let composer = ContextComposer::new(extractor(source), store, memory.clone());
    (composer, memory)
}

fn history(messages: &[PromptMessage]) -> Vec<&str> {
    messages
        .iter()
        .filter(|m| m.role != PromptRole::System)
        .map(|m| m.content.as_str())
        .collect()
}

#[tokio::test]
async fn truncates_to_ten_most_recent_turns() {
    let (composer, memory) = composer_with(
        FixedSource::replying(r#"{"intent": "ask_question", "topic": "misc"}"#),
        Arc::new(InMemoryKnowledgeStore::new()),
    );
    memory.set_policy("s", MemoryPolicy::Window, Some(20)).unwrap();
    for i in 0..15 {
        memory.append_turn("s", Role::User, &format!("turn {}", i));
    }

    let composed = composer.compose("s", "latest", "alice").await;
    let turns = history(&composed.messages);

    assert_eq!(turns.len(), 11);
    let expected: Vec<String> = (5..15).map(|i| format!("turn {}", i)).collect();
    assert_eq!(&turns[..10], expected.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(turns[10], "latest");
}

#[tokio::test]
async fn failed_extraction_and_empty_profile_give_generic_prompt() {
    let source = FixedSource::failing();
    let (composer, _) = composer_with(source.clone(), Arc::new(InMemoryKnowledgeStore::new()));

    let composed = composer.compose("s", "hello", "alice").await;

    assert!(composed.metadata.is_fallback());
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    assert_eq!(composed.messages.len(), 2);
    assert_eq!(composed.messages[0], PromptMessage::system(NO_PROFILE_INSTRUCTION));
    assert_eq!(composed.messages[1], PromptMessage::user("hello"));
}

#[tokio::test]
async fn store_failure_degrades_to_empty_profile() {
    let (composer, _) = composer_with(
        FixedSource::replying(PERSONAL_QUERY),
        Arc::new(UnreachableStore),
    );

    let composed = composer.compose("s", "what should I learn next?", "alice").await;

    assert!(composed.profile_degraded);
    assert_eq!(composed.messages[0].content, NO_PROFILE_INSTRUCTION);
    assert_eq!(
        composed.messages[1],
        PromptMessage::system("Query analysis: Intent=request_recommendation, Topic=Rust")
    );
}

#[tokio::test]
async fn profile_block_uses_topic_hint() {
    let store = Arc::new(InMemoryKnowledgeStore::new());
    store.add_item("alice", ProfileCategory::Interest, "agents").await.unwrap();
    store.add_item("alice", ProfileCategory::Skill, "Python").await.unwrap();
    store.add_item("alice", ProfileCategory::Topic, "Rust async").await.unwrap();
    store.add_item("alice", ProfileCategory::Topic, "Gardening").await.unwrap();

    let (composer, _) = composer_with(FixedSource::replying(PERSONAL_QUERY), store);
    let composed = composer.compose("s", "recommend a crate", "alice").await;

    let profile = &composed.messages[0];
    assert_eq!(profile.role, PromptRole::System);
    assert!(profile.content.starts_with(
        "User profile:\n- Interested in agents\n- Has skills in Python\n- Has talked about Rust async"
    ));
    assert!(!profile.content.contains("Gardening"));
    assert!(profile.content.ends_with(PROFILE_RESTRICTION));
}

#[tokio::test]
async fn profile_is_skipped_when_not_requested() {
    let store = Arc::new(InMemoryKnowledgeStore::new());
    store.add_item("alice", ProfileCategory::Skill, "Go").await.unwrap();

    let (composer, _) = composer_with(
        FixedSource::replying(r#"{"intent": "trivia_question", "topic": "history", "use_KG": false}"#),
        store,
    );
    let composed = composer.compose("s", "who built the pyramids?", "alice").await;

    assert_eq!(composed.messages[0].content, NO_PROFILE_INSTRUCTION);
}

#[tokio::test]
async fn query_is_appended_after_reading_history() {
    let (composer, memory) = composer_with(
        FixedSource::replying(r#"{"intent": "ask_question", "topic": "Rust"}"#),
        Arc::new(InMemoryKnowledgeStore::new()),
    );
    memory.append_turn("s", Role::User, "earlier question");
    memory.append_turn("s", Role::Assistant, "earlier answer");

    let composed = composer.compose("s", "follow up", "alice").await;

    let roles: Vec<PromptRole> = composed.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            PromptRole::System,
            PromptRole::System,
            PromptRole::User,
            PromptRole::Assistant,
            PromptRole::User,
        ]
    );
    assert_eq!(
        history(&composed.messages).iter().filter(|c| **c == "follow up").count(),
        1
    );

    let stored = memory.read_memory("s");
    assert_eq!(stored.turns.len(), 3);
    assert_eq!(stored.turns[2].content, "follow up");
    assert_eq!(stored.turns[2].role, Role::User);
}

#[tokio::test]
async fn history_limit_is_configurable() {
    let (composer, memory) = composer_with(
        FixedSource::failing(),
        Arc::new(InMemoryKnowledgeStore::new()),
    );
    let composer = composer.with_history_limit(2);
    for i in 0..6 {
        memory.append_turn("s", Role::User, &i.to_string());
    }

    let composed = composer.compose("s", "now", "alice").await;
    assert_eq!(history(&composed.messages), vec!["4", "5", "now"]);
}
