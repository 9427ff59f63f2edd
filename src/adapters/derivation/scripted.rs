//! Scripted derivation engine for tests.
//!
//! Configurable failures, simulated latency, and call tracking, so pipeline
//! tests can verify failure isolation and single-flight behavior without a
//! real engine.
//!
//! # Example
//!
//! ```ignore
//! let engine = ScriptedEngine::new()
//!     .with_failure("SOP-3", "model unavailable")
//!     .with_delay(Duration::from_millis(20));
//!
//! assert_eq!(engine.call_count("SOP-3"), 0);
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::domain::foundation::PortalError;
use crate::domain::sop::SourceDocument;
use crate::ports::{DerivationEngine, DerivedContent};

/// Test implementation of [`DerivationEngine`].
#[derive(Debug, Default, Clone)]
pub struct ScriptedEngine {
    /// Error message per sop_id that should fail.
    failures: HashMap<String, String>,
    /// Warnings attached to every successful derivation.
    warnings: Vec<String>,
    /// Simulated latency per call.
    delay: Duration,
    /// Invocations per sop_id.
    calls: Arc<Mutex<HashMap<String, u32>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail derivation for one document with the given message.
    pub fn with_failure(mut self, sop_id: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(sop_id.into(), message.into());
        self
    }

    /// Attach warnings to every successful derivation.
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Simulate latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of derive calls observed for one document.
    pub fn call_count(&self, sop_id: &str) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .get(sop_id)
            .copied()
            .unwrap_or(0)
    }

    /// Total derive calls across all documents.
    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl DerivationEngine for ScriptedEngine {
    async fn derive(&self, source: &SourceDocument) -> Result<DerivedContent, PortalError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(source.sop_id().to_string())
            .or_insert(0) += 1;

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if let Some(message) = self.failures.get(source.sop_id()) {
            return Err(PortalError::derivation(source.sop_id(), message.clone()));
        }

        Ok(DerivedContent {
            title: source.title().to_string(),
            summary: format!("Summary of {}", source.title()),
            keywords: BTreeSet::from(["scripted".to_string()]),
            body: source.body().to_string(),
            warnings: self.warnings.clone(),
        })
    }
}
