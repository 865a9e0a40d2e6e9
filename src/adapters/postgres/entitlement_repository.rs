//! PostgreSQL implementation of EntitlementRepository over the `users` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::payment::{Entitlement, PaymentCode};
use crate::ports::EntitlementRepository;

/// PostgreSQL implementation of the EntitlementRepository port.
#[derive(Clone)]
pub struct PostgresEntitlementRepository {
    pool: PgPool,
}

impl PostgresEntitlementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntitlementRow {
    id: String,
    owned: bool,
    is_banned: bool,
    payment_code: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EntitlementRow> for Entitlement {
    type Error = DomainError;

    fn try_from(row: EntitlementRow) -> Result<Self, Self::Error> {
        let user_id = UserId::new(row.id)
            .map_err(|e| DomainError::database(format!("Invalid user id in users row: {}", e)))?;
        let pending_code = row
            .payment_code
            .map(PaymentCode::parse)
            .transpose()
            .map_err(|e| {
                DomainError::database(format!("Invalid payment_code in users row: {}", e))
            })?;

        Ok(Entitlement {
            user_id,
            owned: row.owned,
            banned: row.is_banned,
            pending_code,
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn user_not_found(user_id: &UserId) -> DomainError {
    DomainError::new(ErrorCode::UserNotFound, format!("User not found: {}", user_id))
}

#[async_trait]
impl EntitlementRepository for PostgresEntitlementRepository {
    async fn find(&self, user_id: &UserId) -> Result<Option<Entitlement>, DomainError> {
        let row: Option<EntitlementRow> = sqlx::query_as(
            "SELECT id, owned, is_banned, payment_code, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load user: {}", e)))?;

        row.map(Entitlement::try_from).transpose()
    }

    async fn find_by_pending_code(&self, code: &str) -> Result<Option<Entitlement>, DomainError> {
        let row: Option<EntitlementRow> = sqlx::query_as(
            "SELECT id, owned, is_banned, payment_code, updated_at FROM users WHERE payment_code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to resolve payment code: {}", e))
        })?;

        row.map(Entitlement::try_from).transpose()
    }

    async fn assign_pending_code(
        &self,
        user_id: &UserId,
        code: &PaymentCode,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE users SET payment_code = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id.as_str())
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to assign payment code: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }

    async fn grant(&self, user_id: &UserId) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE users SET owned = TRUE, payment_code = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to grant ownership: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }
}
