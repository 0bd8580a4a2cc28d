//! Transfer authorization pipeline
//!
//! One request walks RECEIVED -> VALIDATED -> IDENTITY_RESOLVED ->
//! CHARGED | REJECTED | GATEWAY_ERROR. Every request that reaches
//! validation produces exactly one audit record, written after the
//! ledger call resolves so the charge id or error detail is present.
//! The authorizer itself holds no persistent state.

use async_trait::async_trait;
use audit_log::AuditLog;
use identity_store::IdentityStore;
use match_engine::{MatchEngine, Resolution};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use types::embedding::Embedding;
use types::errors::{AuditError, LedgerError, PayError, StoreError};
use types::ids::{ChargeId, RecipientId};
use types::money::Amount;
use types::record::AttemptRecord;

use crate::ledger::Ledger;

/// Sink for attempt records. `AuditLog` is the production
/// implementation; the seam lets tests inject write failures.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, record: AttemptRecord) -> Result<u64, AuditError>;
}

#[async_trait]
impl AuditSink for AuditLog {
    async fn append(&self, record: AttemptRecord) -> Result<u64, AuditError> {
        AuditLog::append(self, record).await
    }
}

/// A successfully authorized and executed transfer.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub charge_id: ChargeId,
    pub message: String,
}

pub struct TransferAuthorizer {
    matcher: MatchEngine,
    store: Arc<dyn IdentityStore>,
    ledger: Arc<dyn Ledger>,
    audit: Arc<dyn AuditSink>,
    currency: String,
    call_timeout: Duration,
}

impl TransferAuthorizer {
    pub fn new(
        matcher: MatchEngine,
        store: Arc<dyn IdentityStore>,
        ledger: Arc<dyn Ledger>,
        audit: Arc<dyn AuditSink>,
        currency: impl Into<String>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            matcher,
            store,
            ledger,
            audit,
            currency: currency.into(),
            call_timeout,
        }
    }

    /// Authorize and execute one transfer attempt.
    ///
    /// No automatic retry on failure or error: the caller must resubmit,
    /// and resubmissions are not deduplicated.
    pub async fn authorize(
        &self,
        recipient_raw: &str,
        amount_major: Decimal,
        probe: &Embedding,
    ) -> Result<TransferOutcome, PayError> {
        // RECEIVED -> VALIDATED. The amount is known from here on, so
        // every rejection from this point is logged.
        let amount = match Amount::from_major(amount_major) {
            Ok(amount) => amount,
            Err(e) => {
                self.record(AttemptRecord::failed(
                    amount_major,
                    &self.currency,
                    recipient_raw,
                    e.to_string(),
                ))
                .await;
                return Err(PayError::InvalidInput(e.to_string()));
            }
        };

        let Some(recipient) = RecipientId::try_new(recipient_raw) else {
            let detail = "invalid recipient account id";
            self.record(AttemptRecord::failed(
                amount.to_major(),
                &self.currency,
                recipient_raw,
                detail,
            ))
            .await;
            return Err(PayError::InvalidInput(detail.into()));
        };

        // VALIDATED -> IDENTITY_RESOLVED, against a point-in-time
        // snapshot of the enrolled set. The snapshot read carries the
        // same bound as every other external call.
        let snapshot = tokio::time::timeout(self.call_timeout, self.store.all_identities())
            .await
            .unwrap_or(Err(StoreError::Timeout));
        let candidates = match snapshot {
            Ok(candidates) => candidates,
            Err(e) => {
                self.record(AttemptRecord::error(
                    amount,
                    &self.currency,
                    recipient.as_str(),
                    e.to_string(),
                ))
                .await;
                return Err(e.into());
            }
        };

        let identity = match self.matcher.resolve(probe, &candidates) {
            Ok(Resolution::Match(identity)) => identity,
            Ok(Resolution::NoMatch) => {
                self.record(AttemptRecord::failed(
                    amount.to_major(),
                    &self.currency,
                    recipient.as_str(),
                    PayError::FaceNotRecognized.to_string(),
                ))
                .await;
                return Err(PayError::FaceNotRecognized);
            }
            Err(e) => {
                self.record(AttemptRecord::error(
                    amount,
                    &self.currency,
                    recipient.as_str(),
                    e.to_string(),
                ))
                .await;
                return Err(e.into());
            }
        };

        tracing::info!(
            user = %identity.id,
            recipient = %recipient,
            amount_minor = amount.minor_units(),
            "identity resolved, executing transfer"
        );

        // IDENTITY_RESOLVED -> CHARGED | GATEWAY_ERROR
        match self
            .ledger
            .charge_and_transfer(&identity.payment_token, &recipient, amount)
            .await
        {
            Ok(charge_id) => {
                self.record(AttemptRecord::completed(
                    amount,
                    &self.currency,
                    recipient.as_str(),
                    charge_id.clone(),
                ))
                .await;
                Ok(TransferOutcome {
                    charge_id,
                    message: "Charge successful".into(),
                })
            }
            Err(e) => {
                let detail = match &e {
                    // The charge may or may not have gone through.
                    LedgerError::Timeout => e.to_string(),
                    LedgerError::Declined { detail } => detail.clone(),
                    LedgerError::Unavailable(detail) => detail.clone(),
                };
                self.record(AttemptRecord::error(
                    amount,
                    &self.currency,
                    recipient.as_str(),
                    detail,
                ))
                .await;
                Err(e.into())
            }
        }
    }

    /// Append to the audit trail. A storage fault or timeout here must
    /// not roll back or hide the attempt's outcome (a completed charge
    /// stays completed), so the record falls back to the error channel.
    async fn record(&self, record: AttemptRecord) {
        let result = tokio::time::timeout(self.call_timeout, self.audit.append(record.clone()))
            .await
            .unwrap_or(Err(AuditError::Timeout));
        if let Err(e) = result {
            tracing::error!(error = %e, record = ?record, "audit append failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use audit_log::read_all;
    use identity_store::MemoryStore;
    use std::str::FromStr;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use types::identity::Identity;
    use types::record::AttemptStatus;

    struct MockLedger {
        outcome: Result<&'static str, LedgerError>,
        calls: Mutex<u32>,
    }

    impl MockLedger {
        fn succeeding(charge_id: &'static str) -> Self {
            Self {
                outcome: Ok(charge_id),
                calls: Mutex::new(0),
            }
        }

        fn failing(error: LedgerError) -> Self {
            Self {
                outcome: Err(error),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Ledger for MockLedger {
        async fn charge_and_transfer(
            &self,
            _sender_token: &str,
            _recipient: &RecipientId,
            _amount: Amount,
        ) -> Result<ChargeId, LedgerError> {
            *self.calls.lock().unwrap() += 1;
            self.outcome.clone().map(ChargeId::new)
        }
    }

    struct Fixture {
        authorizer: TransferAuthorizer,
        ledger: Arc<MockLedger>,
        _tmp: TempDir,
        journal: std::path::PathBuf,
    }

    async fn fixture(ledger: MockLedger) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let journal = tmp.path().join("attempts.bin");
        let audit = AuditLog::open(&journal).unwrap();

        let store = Arc::new(MemoryStore::new(3));
        store
            .enroll(Identity::new(
                "Ada Lovelace",
                "cus_ada",
                Embedding::new(vec![0.0, 0.0, 0.0]),
            ))
            .await
            .unwrap();

        let ledger = Arc::new(ledger);
        let authorizer = TransferAuthorizer::new(
            MatchEngine::new(1.0),
            store,
            ledger.clone(),
            Arc::new(audit),
            "GBP",
            Duration::from_secs(5),
        );
        Fixture {
            authorizer,
            ledger,
            _tmp: tmp,
            journal,
        }
    }

    fn near_probe() -> Embedding {
        Embedding::new(vec![0.1, 0.0, 0.0])
    }

    #[tokio::test]
    async fn test_completed_transfer_writes_one_completed_record() {
        let fx = fixture(MockLedger::succeeding("ch_1")).await;

        let outcome = fx
            .authorizer
            .authorize("acct_123", Decimal::from_str("10.50").unwrap(), &near_probe())
            .await
            .unwrap();
        assert_eq!(outcome.charge_id, ChargeId::new("ch_1"));
        assert_eq!(fx.ledger.call_count(), 1);

        let records = read_all(&fx.journal).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttemptStatus::Completed);
        assert_eq!(records[0].amount, Decimal::from_str("10.50").unwrap());
        assert_eq!(records[0].currency, "GBP");
        assert_eq!(records[0].to, "acct_123");
        assert_eq!(records[0].charge_id, Some(ChargeId::new("ch_1")));
    }

    #[tokio::test]
    async fn test_non_positive_amount_never_reaches_ledger() {
        let fx = fixture(MockLedger::succeeding("ch_1")).await;

        let err = fx
            .authorizer
            .authorize("acct_123", Decimal::ZERO, &near_probe())
            .await
            .unwrap_err();
        assert!(matches!(err, PayError::InvalidInput(_)));
        assert_eq!(fx.ledger.call_count(), 0);

        let records = read_all(&fx.journal).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttemptStatus::Failed);
        assert_eq!(records[0].charge_id, None);
    }

    #[tokio::test]
    async fn test_bad_recipient_prefix_never_reaches_ledger() {
        let fx = fixture(MockLedger::succeeding("ch_1")).await;

        let err = fx
            .authorizer
            .authorize("123", Decimal::ONE, &near_probe())
            .await
            .unwrap_err();
        assert!(matches!(err, PayError::InvalidInput(_)));
        assert_eq!(fx.ledger.call_count(), 0);

        let records = read_all(&fx.journal).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].to, "123");
        assert_eq!(records[0].status, AttemptStatus::Failed);
    }

    #[tokio::test]
    async fn test_unrecognized_face_writes_failed_record_without_charge_id() {
        let fx = fixture(MockLedger::succeeding("ch_1")).await;

        let err = fx
            .authorizer
            .authorize(
                "acct_123",
                Decimal::ONE,
                &Embedding::new(vec![5.0, 0.0, 0.0]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PayError::FaceNotRecognized));
        assert_eq!(fx.ledger.call_count(), 0);

        let records = read_all(&fx.journal).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttemptStatus::Failed);
        assert_eq!(records[0].charge_id, None);
        assert_eq!(records[0].error.as_deref(), Some("Face not recognized"));
    }

    #[tokio::test]
    async fn test_declined_charge_writes_error_record_with_detail() {
        let fx = fixture(MockLedger::failing(LedgerError::Declined {
            detail: "card_declined".into(),
        }))
        .await;

        let err = fx
            .authorizer
            .authorize("acct_456", Decimal::from_str("5.00").unwrap(), &near_probe())
            .await
            .unwrap_err();
        assert!(matches!(err, PayError::Ledger(_)));
        assert_eq!(fx.ledger.call_count(), 1);

        let records = read_all(&fx.journal).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttemptStatus::Error);
        assert!(records[0].error.as_deref().unwrap().contains("card_declined"));
    }

    #[tokio::test]
    async fn test_ledger_timeout_is_recorded_as_status_unknown() {
        let fx = fixture(MockLedger::failing(LedgerError::Timeout)).await;

        let err = fx
            .authorizer
            .authorize("acct_456", Decimal::ONE, &near_probe())
            .await
            .unwrap_err();
        assert!(matches!(err, PayError::Ledger(LedgerError::Timeout)));

        let records = read_all(&fx.journal).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttemptStatus::Error);
        assert!(records[0].error.as_deref().unwrap().contains("status unknown"));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_an_error_not_a_rejection() {
        let fx = fixture(MockLedger::succeeding("ch_1")).await;

        let err = fx
            .authorizer
            .authorize("acct_123", Decimal::ONE, &Embedding::new(vec![0.0; 2]))
            .await
            .unwrap_err();
        assert!(matches!(err, PayError::Match(_)));
        assert_eq!(fx.ledger.call_count(), 0);

        let records = read_all(&fx.journal).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttemptStatus::Error);
    }

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn append(&self, _record: AttemptRecord) -> Result<u64, AuditError> {
            Err(AuditError::Storage("disk full".into()))
        }
    }

    struct StalledSink;

    #[async_trait]
    impl AuditSink for StalledSink {
        async fn append(&self, _record: AttemptRecord) -> Result<u64, AuditError> {
            std::future::pending().await
        }
    }

    struct StalledStore;

    #[async_trait]
    impl identity_store::IdentityStore for StalledStore {
        async fn enroll(&self, _identity: Identity) -> Result<Identity, StoreError> {
            std::future::pending().await
        }

        async fn all_identities(&self) -> Result<Vec<Identity>, StoreError> {
            std::future::pending().await
        }
    }

    fn authorizer_with(
        store: Arc<dyn IdentityStore>,
        ledger: Arc<MockLedger>,
        audit: Arc<dyn AuditSink>,
    ) -> TransferAuthorizer {
        TransferAuthorizer::new(
            MatchEngine::new(1.0),
            store,
            ledger,
            audit,
            "GBP",
            Duration::from_millis(50),
        )
    }

    async fn enrolled_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new(3));
        store
            .enroll(Identity::new(
                "Ada Lovelace",
                "cus_ada",
                Embedding::new(vec![0.0, 0.0, 0.0]),
            ))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_audit_write_failure_does_not_hide_completed_charge() {
        let ledger = Arc::new(MockLedger::succeeding("ch_1"));
        let authorizer =
            authorizer_with(enrolled_store().await, ledger.clone(), Arc::new(FailingSink));

        let outcome = authorizer
            .authorize("acct_123", Decimal::from_str("10.50").unwrap(), &near_probe())
            .await
            .unwrap();
        assert_eq!(outcome.charge_id, ChargeId::new("ch_1"));
        assert_eq!(ledger.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_audit_write_timeout_does_not_hide_completed_charge() {
        let ledger = Arc::new(MockLedger::succeeding("ch_1"));
        let authorizer =
            authorizer_with(enrolled_store().await, ledger.clone(), Arc::new(StalledSink));

        let outcome = authorizer
            .authorize("acct_123", Decimal::ONE, &near_probe())
            .await
            .unwrap();
        assert_eq!(outcome.charge_id, ChargeId::new("ch_1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_store_snapshot_times_out() {
        let ledger = Arc::new(MockLedger::succeeding("ch_1"));
        let authorizer =
            authorizer_with(Arc::new(StalledStore), ledger.clone(), Arc::new(FailingSink));

        let err = authorizer
            .authorize("acct_123", Decimal::ONE, &near_probe())
            .await
            .unwrap_err();
        assert!(matches!(err, PayError::Store(StoreError::Timeout)));
        assert_eq!(ledger.call_count(), 0);
    }
}
