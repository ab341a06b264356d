//! Public scan verification.
//!
//! The verifier is the orchestrator for the unauthenticated scan path. Each
//! request walks a fixed state machine, short-circuiting on the first
//! failing check:
//!
//! ```text
//! START -> IP_CHECKED -> TOKEN_RESOLVED -> STATE_VALIDATED -> PIN_CHECKED
//!       -> ALLOWED | DENIED
//! ```
//!
//! Denials are logged with their specific reason but returned as
//! [`ScanDenied`] variants whose public shape leaks nothing beyond the
//! status class. Side effects that already happened (counter increments,
//! audit entries) are never rolled back, even if the client disconnects
//! before the response lands.

use std::sync::Arc;

use digicare_core::{CardDateTime, Clock, HealthCard, ScanFailureReason, ScanLogEntry};
use digicare_notifications::{NotificationDispatch, ScanAlert};

use crate::bundle::{BundleAssembler, BundleAudience, RecordBundle};
use crate::config::CardConfig;
use crate::error::ScanDenied;
use crate::limiter::{AttemptStore, IpDecision, LockoutState};
use crate::pin::verify_pin;
use crate::storage::{CardStorage, ScanLogStorage};

/// One inbound scan request.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub access_token: String,
    pub pin: Option<String>,
    pub source_ip: String,
    pub user_agent: String,
}

/// Successful scan result.
#[derive(Debug)]
pub struct ScanSuccess {
    pub bundle: RecordBundle,
    pub scanned_at: CardDateTime,
}

/// Orchestrates IP limiting, token resolution, lifecycle and PIN checks,
/// audit logging, bundle assembly and owner notification.
pub struct ScanVerifier {
    cards: Arc<dyn CardStorage>,
    attempts: Arc<dyn AttemptStore>,
    scan_log: Arc<dyn ScanLogStorage>,
    notifications: Arc<dyn NotificationDispatch>,
    assembler: Arc<BundleAssembler>,
    config: CardConfig,
    clock: Arc<dyn Clock>,
}

impl ScanVerifier {
    pub fn new(
        cards: Arc<dyn CardStorage>,
        attempts: Arc<dyn AttemptStore>,
        scan_log: Arc<dyn ScanLogStorage>,
        notifications: Arc<dyn NotificationDispatch>,
        assembler: Arc<BundleAssembler>,
        config: CardConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cards,
            attempts,
            scan_log,
            notifications,
            assembler,
            config,
            clock,
        }
    }

    /// Decides ALLOW/DENY for one scan request.
    pub async fn verify(&self, request: &ScanRequest) -> Result<ScanSuccess, ScanDenied> {
        let now = self.clock.now();

        // START -> IP_CHECKED. No card is resolved yet, so nothing is
        // logged; the counter increment itself is the durable effect.
        let ip_decision = self
            .attempts
            .check_and_increment_ip(&request.source_ip, &self.config.rate_limiting, now)
            .await
            .map_err(|e| self.internal("ip limiter", e))?;
        if ip_decision == IpDecision::RateLimited {
            tracing::warn!(ip = %request.source_ip, "scan rate limited");
            return Err(ScanDenied::RateLimited);
        }

        // IP_CHECKED -> TOKEN_RESOLVED. Exact-match lookup only.
        let card = self
            .cards
            .find_by_token(&request.access_token)
            .await
            .map_err(|e| self.internal("token resolve", e))?;
        let Some(card) = card else {
            tracing::warn!(ip = %request.source_ip, "scan with unknown token");
            return Err(ScanDenied::UnknownToken);
        };

        // TOKEN_RESOLVED -> STATE_VALIDATED. Expired and non-Active cards
        // produce the same denial so the response cannot reveal which rule
        // fired.
        if !card.is_scannable(now) {
            tracing::warn!(
                card_id = %card.id,
                status = card.status.display(),
                expired = card.is_expired(now),
                "scan denied: invalid card state"
            );
            self.log_denied(&card, request, now, ScanFailureReason::InvalidCardState)
                .await;
            return Err(ScanDenied::CardNotScannable);
        }

        // STATE_VALIDATED -> PIN_CHECKED.
        if let Some(pin_hash) = &card.pin_hash {
            let lockout = self
                .attempts
                .pin_lockout(&card.access_token, &self.config.lockout, now)
                .await
                .map_err(|e| self.internal("lockout check", e))?;
            if lockout == LockoutState::Locked {
                tracing::warn!(card_id = %card.id, "scan denied: token locked");
                self.log_denied(&card, request, now, ScanFailureReason::Locked)
                    .await;
                return Err(ScanDenied::Locked);
            }

            let Some(pin) = request.pin.as_deref() else {
                // Discovery response, not a credential failure; the audit
                // entry stays out of the denied count.
                self.log_best_effort(ScanLogEntry::discovery(
                    card.id,
                    CardDateTime::new(now),
                    request.source_ip.clone(),
                    request.user_agent.clone(),
                ))
                .await;
                return Err(ScanDenied::PinRequired);
            };

            let verified = verify_pin(pin, pin_hash).map_err(|e| self.internal("pin verify", e))?;
            if !verified {
                let failures = self
                    .attempts
                    .record_pin_failure(&card.access_token, &self.config.lockout, now)
                    .await
                    .map_err(|e| self.internal("failure counter", e))?;
                tracing::warn!(card_id = %card.id, failures, "scan denied: invalid PIN");
                self.log_denied(&card, request, now, ScanFailureReason::InvalidPin)
                    .await;
                return Err(ScanDenied::InvalidPin);
            }

            self.attempts
                .record_pin_success(&card.access_token)
                .await
                .map_err(|e| self.internal("success counter", e))?;
        }

        // PIN_CHECKED -> ALLOWED.
        let scanned_at = CardDateTime::new(now);
        self.log_best_effort(ScanLogEntry::success(
            card.id,
            scanned_at,
            request.source_ip.clone(),
            request.user_agent.clone(),
        ))
        .await;

        self.cards
            .record_scan(card.id, now)
            .await
            .map_err(|e| self.internal("scan bookkeeping", e))?;

        let bundle = self
            .assembler
            .assemble(&card, BundleAudience::PublicScan)
            .await
            .map_err(|e| self.internal("bundle assembly", e))?;

        self.notify_owner(&card, scanned_at);

        Ok(ScanSuccess { bundle, scanned_at })
    }

    /// Spawns the owner alert with its own timeout; the response never
    /// waits on delivery.
    fn notify_owner(&self, card: &HealthCard, scanned_at: CardDateTime) {
        let alert = ScanAlert {
            owner_id: card.owner_id,
            card_number: card.card_number.clone(),
            scanned_at,
        };
        let dispatch = Arc::clone(&self.notifications);
        let timeout = self.config.notification_timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, dispatch.card_scanned(alert)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "owner scan alert failed"),
                Err(_) => tracing::error!("owner scan alert timed out"),
            }
        });
    }

    async fn log_denied(
        &self,
        card: &HealthCard,
        request: &ScanRequest,
        now: time::OffsetDateTime,
        reason: ScanFailureReason,
    ) {
        self.log_best_effort(ScanLogEntry::denied(
            card.id,
            CardDateTime::new(now),
            request.source_ip.clone(),
            request.user_agent.clone(),
            reason,
        ))
        .await;
    }

    /// Audit writes never fail or delay a scan; failures go to operational
    /// logging only.
    async fn log_best_effort(&self, entry: ScanLogEntry) {
        if let Err(e) = self.scan_log.record(&entry).await {
            tracing::error!(card_id = %entry.card_id, error = %e, "scan audit write failed");
        }
    }

    fn internal(&self, stage: &str, error: crate::error::CardError) -> ScanDenied {
        tracing::error!(stage, error = %error, "scan verification internal failure");
        ScanDenied::Internal
    }
}
