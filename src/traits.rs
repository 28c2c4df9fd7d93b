//! Traits for the remote collaborators of a reconciliation session

use async_trait::async_trait;

use crate::types::*;

/// The remote matcher that partitions expected expenses against the report
///
/// Implementations own transport and (de)serialization; the session only
/// sees the resulting partition or a [`ClientError`].
#[async_trait]
pub trait RemoteMatcher: Send + Sync {
    /// Match the expected expenses in `request` against the cardholder's report
    async fn reconcile(&self, request: &ReconcileRequest) -> Result<ReconcileResponse, ClientError>;
}

/// Generator of affidavit documents for purchases without a receipt
#[async_trait]
pub trait AffidavitService: Send + Sync {
    /// Produce a filled affidavit for one purchase
    async fn generate_affidavit(
        &self,
        request: &AffidavitRequest,
    ) -> Result<AffidavitDocument, ClientError>;
}
