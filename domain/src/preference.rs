//! Per-subject delivery preferences.
//!
//! A subject with no stored preference is allowed to stream. Only an explicit
//! `streaming_enabled = false` denies a stream.

use crate::SubjectId;
use async_trait::async_trait;
use dashmap::DashMap;
use log::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub streaming_enabled: bool,
}

/// Source of delivery preferences consulted when a subject opens a stream.
#[async_trait]
pub trait PreferenceLookup: Send + Sync {
    async fn lookup(&self, subject_id: &SubjectId) -> Option<Preference>;
}

/// Applies the default-allow policy to a looked up preference.
pub fn streaming_allowed(preference: Option<&Preference>) -> bool {
    preference.map_or(true, |preference| preference.streaming_enabled)
}

/// Process-local preference store.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    preferences: DashMap<SubjectId, Preference>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store where each listed subject has streaming disabled.
    pub fn with_streaming_disabled<I>(subject_ids: I) -> Self
    where
        I: IntoIterator<Item = SubjectId>,
    {
        let store = Self::new();
        for subject_id in subject_ids {
            store.set(
                subject_id,
                Preference {
                    streaming_enabled: false,
                },
            );
        }
        store
    }

    pub fn set(&self, subject_id: SubjectId, preference: Preference) {
        debug!("Setting delivery preference for {subject_id}: {preference:?}");
        self.preferences.insert(subject_id, preference);
    }

    pub fn remove(&self, subject_id: &SubjectId) -> Option<Preference> {
        self.preferences.remove(subject_id).map(|(_, preference)| preference)
    }
}

#[async_trait]
impl PreferenceLookup for InMemoryPreferences {
    async fn lookup(&self, subject_id: &SubjectId) -> Option<Preference> {
        self.preferences.get(subject_id).map(|entry| *entry.value())
    }
}
