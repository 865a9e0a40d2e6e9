//! Shared fixtures for payment handler tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::adapters::memory::InMemoryEntitlementRepository;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::payment::{Entitlement, PaymentCode, PaymentLink, PaymentRecord};
use crate::ports::{EntitlementRepository, PaymentCodeGenerator, PaymentLedger};

/// Hands out a fixed sequence of codes, repeating the last one.
pub(crate) struct ScriptedCodeGenerator {
    codes: Mutex<VecDeque<PaymentCode>>,
    last: Mutex<Option<PaymentCode>>,
}

impl ScriptedCodeGenerator {
    pub(crate) fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| PaymentCode::parse(*c).unwrap()).collect()),
            last: Mutex::new(None),
        }
    }
}

impl PaymentCodeGenerator for ScriptedCodeGenerator {
    fn generate(&self) -> PaymentCode {
        let mut last = self.last.lock().unwrap();
        if let Some(code) = self.codes.lock().unwrap().pop_front() {
            *last = Some(code);
        }
        last.clone().expect("scripted generator needs at least one code")
    }
}

/// Ledger whose writes always fail.
pub(crate) struct FailingLedger;

#[async_trait]
impl PaymentLedger for FailingLedger {
    async fn append(&self, _record: &PaymentRecord) -> Result<(), DomainError> {
        Err(DomainError::new(ErrorCode::DatabaseError, "Simulated ledger failure"))
    }

    async fn list_by_user(&self, _user_id: &UserId) -> Result<Vec<PaymentRecord>, DomainError> {
        Ok(vec![])
    }

    async fn list_recent(&self, _limit: u32) -> Result<Vec<PaymentRecord>, DomainError> {
        Ok(vec![])
    }
}

/// Entitlements whose reads work but whose grants always fail.
pub(crate) struct FailingGrants(pub(crate) InMemoryEntitlementRepository);

#[async_trait]
impl EntitlementRepository for FailingGrants {
    async fn find(&self, user_id: &UserId) -> Result<Option<Entitlement>, DomainError> {
        self.0.find(user_id).await
    }

    async fn find_by_pending_code(&self, code: &str) -> Result<Option<Entitlement>, DomainError> {
        self.0.find_by_pending_code(code).await
    }

    async fn assign_pending_code(
        &self,
        user_id: &UserId,
        code: &PaymentCode,
    ) -> Result<(), DomainError> {
        self.0.assign_pending_code(user_id, code).await
    }

    async fn grant(&self, _user_id: &UserId) -> Result<(), DomainError> {
        Err(DomainError::database("Simulated grant failure"))
    }
}

pub(crate) fn user_id() -> UserId {
    UserId::new("user-1").unwrap()
}

pub(crate) fn fresh_user() -> Entitlement {
    Entitlement::new(user_id())
}

pub(crate) fn payment_link() -> PaymentLink {
    PaymentLink {
        bank_code: "mbbank".to_string(),
        account_number: "28368866886".to_string(),
        account_name: "NGUYEN HONG QUANG".to_string(),
        template: "compact".to_string(),
    }
}
