// Integration tests for conversation memory
//
// Tests cover:
// - Window and Summary retention bounds
// - Clear and re-create semantics
// - Concurrent appends on one key
// - Capacity bound under concurrent creation

use kgchat::config::MemoryConfig;
use kgchat::models::memory::{MemoryPolicy, MemorySnapshot};
use kgchat::models::turn::{Role, Turn};
use kgchat::services::ConversationMemory;
use rstest::rstest;
use std::sync::Arc;

fn contents(turns: &[Turn]) -> Vec<String> {
    turns.iter().map(|turn| turn.content.clone()).collect()
}

#[rstest]
#[case(1, 1)]
#[case(1, 7)]
#[case(3, 2)]
#[case(3, 10)]
#[case(5, 23)]
fn window_keeps_exactly_last_w_turns(#[case] window: usize, #[case] appends: usize) {
    let memory = ConversationMemory::default();
    memory.set_policy("k", MemoryPolicy::Window, Some(window)).unwrap();

    let mut appended = Vec::new();
    for i in 0..appends {
        let content = format!("t{}", i);
        memory.append_turn("k", Role::User, &content);
        appended.push(content);

        let snapshot = memory.read_memory("k");
        assert!(snapshot.turns.len() <= window);
        let start = appended.len().saturating_sub(window);
        assert_eq!(contents(&snapshot.turns), appended[start..].to_vec());
        assert!(snapshot.rolling_summary.is_empty());
    }
}

#[rstest]
#[case(1, 3)]
#[case(2, 9)]
#[case(4, 4)]
#[case(3, 17)]
fn summary_folds_evicted_turns_in_order(#[case] window: usize, #[case] appends: usize) {
    let memory = ConversationMemory::default();
    memory.set_policy("k", MemoryPolicy::Summary, Some(window)).unwrap();

    let mut evicted: Vec<String> = Vec::new();
    let mut previous_summary = String::new();
    for i in 0..appends {
        memory.append_turn("k", Role::User, &format!("m{}", i));
        let snapshot = memory.read_memory("k");

        assert!(snapshot.turns.len() <= window);
        assert!(snapshot.rolling_summary.starts_with(&previous_summary));

        if i + 1 > window {
            evicted.push(format!("m{}", i - window));
        }
        assert_eq!(snapshot.rolling_summary, evicted.join(" "));
        for turn in &snapshot.turns {
            let words: Vec<&str> = snapshot.rolling_summary.split(' ').collect();
            assert!(!words.contains(&turn.content.as_str()));
        }
        previous_summary = snapshot.rolling_summary;
    }
}

#[test]
fn buffer_cap_is_independent_of_window_size() {
    let memory = ConversationMemory::new(MemoryConfig {
        buffer_max_turns: 12,
        default_window_size: 2,
        ..MemoryConfig::default()
    });

    for i in 0..20 {
        memory.append_turn("k", Role::User, &i.to_string());
    }

    let snapshot = memory.read_memory("k");
    assert_eq!(snapshot.policy, Some(MemoryPolicy::Buffer));
    assert_eq!(snapshot.turns.len(), 12);
    assert_eq!(snapshot.turns[0].content, "8");
}

#[test]
fn clear_then_append_starts_fresh() {
    let memory = ConversationMemory::default();
    memory.set_policy("k", MemoryPolicy::Summary, Some(1)).unwrap();
    memory.append_turn("k", Role::User, "old1");
    memory.append_turn("k", Role::User, "old2");

    assert!(memory.clear("k"));
    assert_eq!(memory.read_memory("k"), MemorySnapshot::default());

    memory.append_turn("k", Role::User, "new");
    let snapshot = memory.read_memory("k");
    assert_eq!(snapshot.policy, Some(MemoryPolicy::Buffer));
    assert_eq!(contents(&snapshot.turns), vec!["new".to_string()]);
    assert!(snapshot.rolling_summary.is_empty());
}

#[test]
fn reading_unknown_key_has_no_side_effect() {
    let memory = ConversationMemory::default();

    let first = memory.read_memory("ghost");
    let second = memory.read_memory("ghost");
    assert!(first.is_empty());
    assert_eq!(first, second);
    assert!(!memory.contains("ghost"));
    assert!(!memory.clear("ghost"));
}

#[rstest]
#[case("buffer", MemoryPolicy::Buffer)]
#[case("Window", MemoryPolicy::Window)]
#[case(" SUMMARY ", MemoryPolicy::Summary)]
fn policy_names_parse(#[case] raw: &str, #[case] expected: MemoryPolicy) {
    assert_eq!(raw.parse::<MemoryPolicy>().unwrap(), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_on_one_key_lose_nothing() {
    let memory = Arc::new(ConversationMemory::new(MemoryConfig {
        buffer_max_turns: 1000,
        ..MemoryConfig::default()
    }));

    let mut handles = Vec::new();
    for task in 0..8 {
        let memory = memory.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..50 {
                memory.append_turn("shared", Role::User, &format!("{}-{}", task, i));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let snapshot = memory.read_memory("shared");
    assert_eq!(snapshot.turns.len(), 400);

    // 每个任务内部的顺序保持不变
    for task in 0..8 {
        let prefix = format!("{}-", task);
        let sequence: Vec<usize> = snapshot
            .turns
            .iter()
            .filter_map(|turn| turn.content.strip_prefix(&prefix))
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(sequence, (0..50).collect::<Vec<_>>());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_window_appends_stay_bounded() {
    let memory = Arc::new(ConversationMemory::default());
    memory.set_policy("w", MemoryPolicy::Window, Some(3)).unwrap();

    let mut handles = Vec::new();
    for task in 0..4 {
        let memory = memory.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                memory.append_turn("w", Role::Assistant, &format!("{}:{}", task, i));
                assert!(memory.read_memory("w").turns.len() <= 3);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(memory.read_memory("w").turns.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creation_respects_max_keys() {
    let memory = Arc::new(ConversationMemory::new(MemoryConfig {
        max_keys: Some(4),
        ..MemoryConfig::default()
    }));

    let mut handles = Vec::new();
    for task in 0..8 {
        let memory = memory.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                let key = format!("{}-{}", task, i);
                if i % 5 == 0 {
                    memory.set_policy(&key, MemoryPolicy::Window, Some(2)).unwrap();
                }
                memory.append_turn(&key, Role::User, "hi");
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert!(memory.len() <= 4);
    assert!(!memory.is_empty());
}
