use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::directive::validate::DirectiveRejection;
use crate::domain::inventory::Sku;

/// Stage at which a recognized directive was dropped. A grammar mismatch is
/// deliberately absent: unrecognized bracket text is ordinary prose and is
/// never reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropStage {
    /// The directive matched the grammar but carried an out-of-policy field.
    ValidationRejected,
    /// The validated SKU had no catalog match.
    LookupMiss,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroppedDirective {
    pub drop_id: String,
    pub stage: DropStage,
    pub sku: Option<String>,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

impl DroppedDirective {
    pub fn validation_rejected(rejection: &DirectiveRejection) -> Self {
        Self {
            drop_id: Uuid::new_v4().to_string(),
            stage: DropStage::ValidationRejected,
            sku: None,
            reason: rejection.to_string(),
            occurred_at: Utc::now(),
        }
    }

    pub fn lookup_miss(sku: &Sku) -> Self {
        Self {
            drop_id: Uuid::new_v4().to_string(),
            stage: DropStage::LookupMiss,
            sku: Some(sku.as_str().to_string()),
            reason: "sku has no catalog match".to_string(),
            occurred_at: Utc::now(),
        }
    }
}

/// Non-fatal observability channel for dropped directives. Nothing reported
/// here may alter user-visible behavior.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, drop: DroppedDirective);
}

/// Discards everything; the default when the caller has no use for drops.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDiagnosticSink;

impl DiagnosticSink for NullDiagnosticSink {
    fn report(&self, _drop: DroppedDirective) {}
}

#[derive(Clone, Default)]
pub struct InMemoryDiagnosticSink {
    drops: Arc<Mutex<Vec<DroppedDirective>>>,
}

impl InMemoryDiagnosticSink {
    pub fn drops(&self) -> Vec<DroppedDirective> {
        match self.drops.lock() {
            Ok(drops) => drops.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for InMemoryDiagnosticSink {
    fn report(&self, drop: DroppedDirective) {
        match self.drops.lock() {
            Ok(mut drops) => drops.push(drop),
            Err(poisoned) => poisoned.into_inner().push(drop),
        }
    }
}
