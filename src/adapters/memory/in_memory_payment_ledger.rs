//! In-memory payment ledger.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::payment::PaymentRecord;
use crate::ports::PaymentLedger;

/// Append-only vector of records in arrival order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentLedger {
    records: Arc<RwLock<Vec<PaymentRecord>>>,
}

impl InMemoryPaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record written so far, oldest first.
    pub async fn records(&self) -> Vec<PaymentRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentLedger {
    async fn append(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.user_id.as_ref() == Some(user_id))
            .cloned()
            .collect())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<PaymentRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(limit as usize).cloned().collect())
    }
}
