use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PAYMENT_DECLINED_MESSAGE: &str =
    "Payment failed. Please try again or use another payment method.";

const CODE_PREFIX: &str = "ML";
const CODE_LEN: usize = 8;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Opaque receipt identifier returned on a captured payment, shown to the
/// customer as proof of transaction.
///
/// Format: literal `ML` followed by eight uppercase alphanumerics.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(transparent)]
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut code = String::with_capacity(CODE_PREFIX.len() + CODE_LEN);
        code.push_str(CODE_PREFIX);
        for _ in 0..CODE_LEN {
            let idx = rng.gen_range(0..CODE_CHARSET.len());
            code.push(CODE_CHARSET[idx] as char);
        }
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one push-payment request against the gateway.
#[derive(Debug, PartialEq, Clone)]
pub enum PaymentOutcome {
    /// The request is dispatched and the payer has not acted yet.
    Pending,
    Success {
        code: ConfirmationCode,
        completed_at: DateTime<Utc>,
    },
    Failed {
        message: String,
    },
}

/// The payload exposed to the caller once a booking reaches a terminal state
/// with a captured payment.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Confirmation {
    pub total_price: Decimal,
    pub code: ConfirmationCode,
    pub phone: String,
    pub completed_at: DateTime<Utc>,
}

/// Acknowledgement from the notification service for one receipt dispatch.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ReceiptAck {
    pub success: bool,
}
