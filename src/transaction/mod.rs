//! Swap order execution pipeline.
//!
//! A [`DexTransaction`] walks `Building -> Signing -> Submitting -> Submitted`,
//! with an absorbing `Errored` state reachable from any non-terminal stage.
//! Stages run strictly sequentially; each transition is persisted on the
//! transaction before its backend operation runs, and the first failure
//! records the failing step plus the unmodified cause and stops the pipeline.

use crate::core::{PayToAddress, METADATA_MESSAGE_LABEL};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Building,
    Signing,
    Submitting,
    Submitted,
    Errored,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Submitted | TransactionStatus::Errored)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Building => write!(f, "Building"),
            TransactionStatus::Signing => write!(f, "Signing"),
            TransactionStatus::Submitting => write!(f, "Submitting"),
            TransactionStatus::Submitted => write!(f, "Submitted"),
            TransactionStatus::Errored => write!(f, "Errored"),
        }
    }
}

/// First-failure diagnostics recorded on an errored transaction.
#[derive(Debug, Clone)]
pub struct TransactionError {
    /// The stage that failed.
    pub step: TransactionStatus,
    pub reason: String,
    /// The collaborator's original cause, preserved unmodified.
    pub raw_cause: Arc<anyhow::Error>,
}

/// Wallet-side transaction operations. Each call is one pipeline stage; a
/// returned error carries the backend's own cause.
#[async_trait]
pub trait TransactionBackend: Send + Sync {
    async fn pay_to_addresses(&self, payments: &[PayToAddress]) -> anyhow::Result<()>;

    async fn attach_metadata(&self, label: u64, message: serde_json::Value) -> anyhow::Result<()>;

    async fn sign(&self) -> anyhow::Result<()>;

    async fn submit(&self) -> anyhow::Result<()>;
}

/// A swap transaction owned by the caller that requested submission. The
/// pipeline is the only writer of `status`/`error`; callers observe progress
/// through the accessors.
pub struct DexTransaction {
    backend: Box<dyn TransactionBackend>,
    status: Mutex<TransactionStatus>,
    error: Mutex<Option<TransactionError>>,
}

impl DexTransaction {
    pub fn new(backend: Box<dyn TransactionBackend>) -> Self {
        Self {
            backend,
            status: Mutex::new(TransactionStatus::Building),
            error: Mutex::new(None),
        }
    }

    pub fn status(&self) -> TransactionStatus {
        *lock_ignoring_poison(&self.status)
    }

    pub fn error(&self) -> Option<TransactionError> {
        lock_ignoring_poison(&self.error).clone()
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    fn set_status(&self, status: TransactionStatus) {
        debug!("transaction entering {} stage", status);
        *lock_ignoring_poison(&self.status) = status;
    }

    pub(crate) fn record_failure(
        &self,
        step: TransactionStatus,
        reason: &str,
        raw_cause: anyhow::Error,
    ) {
        warn!("transaction failed at {}: {}: {:#}", step, reason, raw_cause);
        *lock_ignoring_poison(&self.error) = Some(TransactionError {
            step,
            reason: reason.to_string(),
            raw_cause: Arc::new(raw_cause),
        });
        *lock_ignoring_poison(&self.status) = TransactionStatus::Errored;
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One pipeline stage: persist the status transition, run the backend
/// operation, absorb a failure into the transaction's error state.
async fn run_stage<F>(
    transaction: &DexTransaction,
    step: TransactionStatus,
    failure_reason: &str,
    operation: F,
) -> Result<(), ()>
where
    F: std::future::Future<Output = anyhow::Result<()>>,
{
    transaction.set_status(step);

    match operation.await {
        Ok(()) => Ok(()),
        Err(cause) => {
            transaction.record_failure(step, failure_reason, cause);
            Err(())
        }
    }
}

/// Sequential driver for a gathered swap order: metadata, then
/// build -> sign -> submit, stopping at the first failed stage.
pub(crate) async fn drive_swap_order(
    transaction: Arc<DexTransaction>,
    metadata_message: serde_json::Value,
    payments: Vec<PayToAddress>,
) {
    // Informational only; a metadata failure never stops the pipeline.
    if let Err(cause) = transaction
        .backend
        .attach_metadata(METADATA_MESSAGE_LABEL, metadata_message)
        .await
    {
        warn!("failed attaching transaction metadata: {:#}", cause);
    }

    if run_stage(
        &transaction,
        TransactionStatus::Building,
        "Failed to build transaction.",
        transaction.backend.pay_to_addresses(&payments),
    )
    .await
    .is_err()
    {
        return;
    }

    if run_stage(
        &transaction,
        TransactionStatus::Signing,
        "Failed to sign transaction.",
        transaction.backend.sign(),
    )
    .await
    .is_err()
    {
        return;
    }

    if run_stage(
        &transaction,
        TransactionStatus::Submitting,
        "Failed submitting transaction.",
        transaction.backend.submit(),
    )
    .await
    .is_err()
    {
        return;
    }

    transaction.set_status(TransactionStatus::Submitted);
}
