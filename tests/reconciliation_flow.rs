//! End-to-end reconciliation scenarios.
//!
//! Drives the application handlers over the in-memory adapters:
//! 1. A user opens a payment session and receives a code
//! 2. Transfer notifications arrive (possibly duplicated or concurrent)
//! 3. Sessions, entitlements and the ledger end up consistent
//!
//! Uses in-memory implementations to exercise the flow without a database.

use std::collections::HashSet;
use std::sync::Arc;

use atmt_payments::adapters::memory::{
    InMemoryEntitlementRepository, InMemoryPaymentLedger, InMemorySessionRepository,
};
use atmt_payments::application::handlers::payment::{
    InitiatePaymentCommand, InitiatePaymentHandler, InitiatePaymentSettings,
    ReconcileTransferCommand, ReconcileTransferHandler,
};
use atmt_payments::config::PaymentConfig;
use atmt_payments::domain::foundation::{Timestamp, UserId};
use atmt_payments::domain::payment::{
    Entitlement, PaymentCode, PaymentSession, PaymentSessionStatus, RandomCodeGenerator,
    Resolution, TransferNotification,
};
use atmt_payments::ports::{
    EntitlementRepository, PaymentCodeGenerator, PaymentLedger, PaymentSessionRepository,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

const PRICE: i64 = 5_000_000;

/// Always returns the same code.
struct FixedCode(PaymentCode);

impl FixedCode {
    fn new(code: &str) -> Self {
        Self(PaymentCode::parse(code).unwrap())
    }
}

impl PaymentCodeGenerator for FixedCode {
    fn generate(&self) -> PaymentCode {
        self.0.clone()
    }
}

struct World {
    config: PaymentConfig,
    sessions: InMemorySessionRepository,
    entitlements: InMemoryEntitlementRepository,
    ledger: InMemoryPaymentLedger,
}

impl World {
    fn new() -> Self {
        Self::with_config(PaymentConfig::new(
            "gateway-key",
            "28368866886",
            "NGUYEN HONG QUANG",
        ))
    }

    fn with_config(config: PaymentConfig) -> Self {
        Self {
            config,
            sessions: InMemorySessionRepository::new(),
            entitlements: InMemoryEntitlementRepository::new(),
            ledger: InMemoryPaymentLedger::new(),
        }
    }

    async fn user(&self, id: &str) -> UserId {
        let user_id = UserId::new(id).unwrap();
        self.entitlements
            .register(Entitlement::new(user_id.clone()))
            .await;
        user_id
    }

    fn initiator(&self, generator: Arc<dyn PaymentCodeGenerator>) -> InitiatePaymentHandler {
        InitiatePaymentHandler::new(
            Arc::new(self.sessions.clone()),
            Arc::new(self.entitlements.clone()),
            generator,
            InitiatePaymentSettings::from(&self.config),
        )
    }

    fn reconciler(&self) -> ReconcileTransferHandler {
        ReconcileTransferHandler::new(
            Arc::new(self.sessions.clone()),
            Arc::new(self.entitlements.clone()),
            Arc::new(self.ledger.clone()),
            self.config.memo_parser(),
            self.config.price,
            self.config.expiry_policy(),
        )
    }

    async fn resolutions(&self) -> Vec<Resolution> {
        self.ledger
            .records()
            .await
            .iter()
            .map(|r| r.resolution)
            .collect()
    }
}

fn notification(id: i64, amount: i64, content: &str) -> ReconcileTransferCommand {
    ReconcileTransferCommand {
        notification: TransferNotification {
            id,
            gateway: "MBBank".to_string(),
            transaction_date: "2024-07-02 11:24:00".to_string(),
            account_number: "28368866886".to_string(),
            content: content.to_string(),
            transfer_type: "in".to_string(),
            transfer_amount: amount,
            reference_code: format!("MBVCB.{}", id),
            ..Default::default()
        },
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn purchase_scenario_end_to_end() {
    let world = World::new();
    let user = world.user("user-u").await;

    let opened = world
        .initiator(Arc::new(FixedCode::new("AB12CD34")))
        .handle(InitiatePaymentCommand {
            user_id: user.clone(),
        })
        .await
        .unwrap()
        .session;
    assert_eq!(opened.code.as_str(), "AB12CD34");
    assert_eq!(opened.amount, PRICE);
    assert_eq!(opened.status, PaymentSessionStatus::Pending);

    let reconciler = world.reconciler();

    // Matching transfer
    let outcome = reconciler
        .handle(notification(1, PRICE, "ATMTAB12CD34 chuyen tien mua san pham"))
        .await
        .unwrap();
    assert_eq!(outcome.resolution, Resolution::Processed);
    let stored = world.sessions.find_by_id(&opened.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentSessionStatus::Completed);
    assert!(world.entitlements.is_owned(&user).await.unwrap());

    // Immediate duplicate
    let duplicate = reconciler
        .handle(notification(1, PRICE, "ATMTAB12CD34 chuyen tien mua san pham"))
        .await
        .unwrap();
    assert_eq!(duplicate.resolution, Resolution::Failed);
    assert!(world.entitlements.is_owned(&user).await.unwrap());

    // Wrong amount with a valid code
    let underpaid = reconciler
        .handle(notification(2, 3_000_000, "ATMTAB12CD34"))
        .await
        .unwrap();
    assert_eq!(underpaid.resolution, Resolution::Ignored);

    // No marker
    let unrelated = reconciler
        .handle(notification(3, PRICE, "no marker here"))
        .await
        .unwrap();
    assert_eq!(unrelated.resolution, Resolution::Ignored);

    assert_eq!(
        world.resolutions().await,
        vec![
            Resolution::Processed,
            Resolution::Failed,
            Resolution::Ignored,
            Resolution::Ignored
        ]
    );
    let linked = world.ledger.list_by_user(&user).await.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].resolution, Resolution::Processed);
}

#[tokio::test]
async fn concurrent_deliveries_grant_once() {
    let world = World::new();
    let user = world.user("user-u").await;
    world
        .initiator(Arc::new(FixedCode::new("AB12CD34")))
        .handle(InitiatePaymentCommand {
            user_id: user.clone(),
        })
        .await
        .unwrap();

    let reconciler = Arc::new(world.reconciler());
    let deliveries = (0..10).map(|_| {
        let reconciler = reconciler.clone();
        tokio::spawn(async move {
            reconciler
                .handle(notification(7, PRICE, "ATMTAB12CD34"))
                .await
                .unwrap()
        })
    });
    let outcomes: Vec<_> = futures::future::join_all(deliveries)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let processed = outcomes
        .iter()
        .filter(|o| o.resolution == Resolution::Processed)
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| o.resolution == Resolution::Failed)
        .count();
    assert_eq!(processed, 1);
    assert_eq!(failed, 9);
    assert_eq!(world.ledger.records().await.len(), 10);
    assert!(world.entitlements.is_owned(&user).await.unwrap());
}

#[tokio::test]
async fn issued_codes_are_unique_and_well_formed() {
    let world = World::new();
    let generator: Arc<dyn PaymentCodeGenerator> = Arc::new(RandomCodeGenerator::new());
    let initiator = world.initiator(generator);

    let mut codes = HashSet::new();
    for i in 0..50 {
        let user = world.user(&format!("user-{}", i)).await;
        let session = initiator
            .handle(InitiatePaymentCommand { user_id: user })
            .await
            .unwrap()
            .session;
        let code = session.code.as_str().to_string();
        assert_eq!(code.len(), 8);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        codes.insert(code);
    }

    assert_eq!(codes.len(), 50);
}

#[tokio::test]
async fn paying_an_expired_session_fails() {
    let world = World::new();
    let user = world.user("user-u").await;
    let stale = PaymentSession::open(
        user.clone(),
        PaymentCode::parse("AB12CD34").unwrap(),
        PRICE,
        String::new(),
        Timestamp::now().minus_minutes(world.config.session_ttl_minutes + 5),
        world.config.session_ttl_minutes,
    );
    world.sessions.insert(&stale).await.unwrap();
    world
        .entitlements
        .assign_pending_code(&user, &stale.code)
        .await
        .unwrap();

    let outcome = world
        .reconciler()
        .handle(notification(1, PRICE, "ATMTAB12CD34"))
        .await
        .unwrap();

    assert_eq!(outcome.resolution, Resolution::Failed);
    assert!(!world.entitlements.is_owned(&user).await.unwrap());

    // A fresh initiation replaces the stale code.
    let renewed = world
        .initiator(Arc::new(FixedCode::new("EF56GH78")))
        .handle(InitiatePaymentCommand {
            user_id: user.clone(),
        })
        .await
        .unwrap();
    assert!(!renewed.resumed);
    assert_eq!(renewed.session.code.as_str(), "EF56GH78");
}

#[tokio::test]
async fn banned_after_initiation_blocks_grant() {
    let world = World::new();
    let user = world.user("user-u").await;
    let session = world
        .initiator(Arc::new(FixedCode::new("AB12CD34")))
        .handle(InitiatePaymentCommand {
            user_id: user.clone(),
        })
        .await
        .unwrap()
        .session;
    world.entitlements.set_banned(&user, true).await.unwrap();

    let outcome = world
        .reconciler()
        .handle(notification(1, PRICE, "ATMTAB12CD34"))
        .await
        .unwrap();

    assert_eq!(outcome.resolution, Resolution::Failed);
    assert!(!world.entitlements.is_owned(&user).await.unwrap());
    let stored = world.sessions.find_by_id(&session.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentSessionStatus::Completed);
}
