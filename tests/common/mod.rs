// Shared fakes for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use kgchat::error::{AppError, Result};
use kgchat::models::metadata::PairMetadata;
use kgchat::models::profile::{ProfileCategory, ProfileContext};
use kgchat::models::prompt::PromptMessage;
use kgchat::services::{CompletionSource, LlmGateway, MetadataExtractor, RetryPolicy};
use kgchat::storage::KnowledgeStore;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Completion source that always returns the same reply
pub struct FixedSource {
    reply: Option<String>,
    pub calls: AtomicUsize,
}

impl FixedSource {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CompletionSource for FixedSource {
    async fn complete_prompt(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| AppError::Gateway("service unavailable".into()))
    }
}

pub fn extractor(source: Arc<FixedSource>) -> Arc<MetadataExtractor> {
    Arc::new(MetadataExtractor::new(source, RetryPolicy::immediate(3)))
}

/// Store whose every call fails as unreachable
pub struct UnreachableStore;

#[async_trait]
impl KnowledgeStore for UnreachableStore {
    async fn ensure_user(&self, _user: &str) -> Result<()> {
        Err(AppError::StoreUnavailable("connection refused".into()))
    }

    async fn fetch_profile(&self, _user: &str, _topic_hint: Option<&str>) -> Result<ProfileContext> {
        Err(AppError::StoreUnavailable("connection refused".into()))
    }

    async fn upsert_tags(&self, _user: &str, _tags: &PairMetadata) -> Result<()> {
        Err(AppError::StoreUnavailable("connection refused".into()))
    }

    async fn add_item(&self, _user: &str, _category: ProfileCategory, _value: &str) -> Result<()> {
        Err(AppError::StoreUnavailable("connection refused".into()))
    }

    async fn update_item(
        &self,
        _user: &str,
        _category: ProfileCategory,
        _old_value: &str,
        _new_value: &str,
    ) -> Result<bool> {
        Err(AppError::StoreUnavailable("connection refused".into()))
    }

    async fn delete_item(
        &self,
        _user: &str,
        _category: ProfileCategory,
        _value: &str,
    ) -> Result<bool> {
        Err(AppError::StoreUnavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<()> {
        Err(AppError::StoreUnavailable("connection refused".into()))
    }
}

/// Gateway that records every request and replies with a counter
#[derive(Default)]
pub struct RecordingGateway {
    pub requests: Mutex<Vec<Vec<PromptMessage>>>,
}

#[async_trait]
impl LlmGateway for RecordingGateway {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String> {
        let mut requests = self.requests.lock();
        requests.push(messages.to_vec());
        Ok(format!("reply {}", requests.len()))
    }
}
