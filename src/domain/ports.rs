use super::booking::ReceiptSummary;
use super::payment::{PaymentOutcome, ReceiptAck};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Push-payment collaborator. `request` may suspend for as long as the payer
/// takes to authorize on their handset; a decline comes back as
/// `PaymentOutcome::Failed`, while `Err` means the gateway itself faulted.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn request(&self, phone: &str, amount: Decimal) -> Result<PaymentOutcome>;
}

/// Receipt dispatch collaborator. A failed delivery is reported through the
/// acknowledgement, not through `Err`.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_receipt(&self, email: &str, summary: &ReceiptSummary) -> Result<ReceiptAck>;
}

pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type NotificationServiceBox = Box<dyn NotificationService>;
