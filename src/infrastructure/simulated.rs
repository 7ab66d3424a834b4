use crate::domain::booking::ReceiptSummary;
use crate::domain::payment::{
    ConfirmationCode, PAYMENT_DECLINED_MESSAGE, PaymentOutcome, ReceiptAck,
};
use crate::domain::ports::{NotificationService, PaymentGateway};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Fraction of probabilistic requests that decline.
const DECLINE_RATE: f64 = 0.1;

const DISPATCH_DELAY: Duration = Duration::from_millis(1500);
const PIN_ENTRY_DELAY: Duration = Duration::from_millis(3000);
const RECEIPT_DELAY: Duration = Duration::from_millis(1000);

/// How the simulated gateway resolves a push-payment request.
///
/// Both policies ship: `Probabilistic` declines 10% of requests the way a
/// live demo does, `Deterministic` always authorizes. They are deliberately
/// kept as separate strategies rather than merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    Probabilistic,
    Deterministic,
}

/// Timing and resolution knobs for the simulated gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Network dispatch of the push request.
    pub dispatch_delay: Duration,
    /// The payer typing their PIN on the handset.
    pub pin_entry_delay: Duration,
    pub policy: ResolutionPolicy,
}

impl GatewayConfig {
    pub fn new(policy: ResolutionPolicy) -> Self {
        Self {
            dispatch_delay: DISPATCH_DELAY,
            pin_entry_delay: PIN_ENTRY_DELAY,
            policy,
        }
    }

    /// Zero-delay variant for tests and `--fast` runs.
    pub fn instant(policy: ResolutionPolicy) -> Self {
        Self {
            dispatch_delay: Duration::ZERO,
            pin_entry_delay: Duration::ZERO,
            policy,
        }
    }
}

/// Simulated STK-push gateway: two sequential suspensions standing in for
/// network dispatch and PIN entry, then a policy-driven resolution.
pub struct SimulatedPaymentGateway {
    config: GatewayConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedPaymentGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeds the RNG so the decline sequence and generated codes are
    /// reproducible.
    pub fn with_seed(config: GatewayConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn request(&self, phone: &str, amount: Decimal) -> Result<PaymentOutcome> {
        debug!(phone, %amount, "dispatching push-payment request");
        tokio::time::sleep(self.config.dispatch_delay).await;
        tokio::time::sleep(self.config.pin_entry_delay).await;

        let mut rng = self.rng.lock().await;
        let declined = match self.config.policy {
            ResolutionPolicy::Deterministic => false,
            ResolutionPolicy::Probabilistic => rng.gen_range(0.0..1.0) < DECLINE_RATE,
        };
        if declined {
            debug!(phone, "push-payment declined");
            return Ok(PaymentOutcome::Failed {
                message: PAYMENT_DECLINED_MESSAGE.to_string(),
            });
        }

        let code = ConfirmationCode::generate(&mut *rng);
        debug!(phone, code = %code, "push-payment authorized");
        Ok(PaymentOutcome::Success {
            code,
            completed_at: Utc::now(),
        })
    }
}

/// Simulated receipt-email dispatch. Delivery currently always succeeds;
/// `undeliverable` models a provider outage so the partial-success path
/// stays exercised.
pub struct SimulatedNotificationService {
    delay: Duration,
    undeliverable: bool,
}

impl SimulatedNotificationService {
    pub fn new() -> Self {
        Self {
            delay: RECEIPT_DELAY,
            undeliverable: false,
        }
    }

    pub fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
            undeliverable: false,
        }
    }

    pub fn undeliverable(mut self) -> Self {
        self.undeliverable = true;
        self
    }
}

impl Default for SimulatedNotificationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationService for SimulatedNotificationService {
    async fn send_receipt(&self, email: &str, summary: &ReceiptSummary) -> Result<ReceiptAck> {
        debug!(email, code = %summary.confirmation_code, "dispatching receipt");
        tokio::time::sleep(self.delay).await;
        Ok(ReceiptAck {
            success: !self.undeliverable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic_policy_always_authorizes() {
        let gateway = SimulatedPaymentGateway::with_seed(
            GatewayConfig::instant(ResolutionPolicy::Deterministic),
            3,
        );
        for _ in 0..50 {
            let outcome = gateway
                .request("254712345678", Decimal::from(100))
                .await
                .unwrap();
            assert!(matches!(outcome, PaymentOutcome::Success { .. }));
        }
    }

    #[tokio::test]
    async fn test_probabilistic_policy_reproducible_under_seed() {
        let run = |seed| async move {
            let gateway = SimulatedPaymentGateway::with_seed(
                GatewayConfig::instant(ResolutionPolicy::Probabilistic),
                seed,
            );
            let mut declines = Vec::new();
            for i in 0..100 {
                let outcome = gateway
                    .request("254712345678", Decimal::from(100))
                    .await
                    .unwrap();
                if matches!(outcome, PaymentOutcome::Failed { .. }) {
                    declines.push(i);
                }
            }
            declines
        };
        assert_eq!(run(42).await, run(42).await);
    }

    #[tokio::test]
    async fn test_decline_carries_standard_message() {
        let gateway = SimulatedPaymentGateway::with_seed(
            GatewayConfig::instant(ResolutionPolicy::Probabilistic),
            0,
        );
        // Draw until the seed produces a decline.
        for _ in 0..1000 {
            let outcome = gateway
                .request("254712345678", Decimal::from(100))
                .await
                .unwrap();
            if let PaymentOutcome::Failed { message } = outcome {
                assert_eq!(message, PAYMENT_DECLINED_MESSAGE);
                return;
            }
        }
        panic!("seed 0 never declined in 1000 draws");
    }

    #[tokio::test]
    async fn test_undeliverable_receipt_reports_failure() {
        let service = SimulatedNotificationService::instant().undeliverable();
        let summary = ReceiptSummary {
            customer_name: "Asha Mwangi".to_string(),
            phone: "254712345678".to_string(),
            check_in: chrono::NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            check_out: chrono::NaiveDate::from_ymd_opt(2026, 9, 5).unwrap(),
            guests: 2,
            total_price: Decimal::from(54000),
            confirmation_code: "MLAAAA0000".to_string(),
        };
        let ack = service
            .send_receipt("asha@example.com", &summary)
            .await
            .unwrap();
        assert!(!ack.success);
    }
}
