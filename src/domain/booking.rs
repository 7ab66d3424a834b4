use crate::error::BookingError;
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Kenyan mobile MSISDN: country code 254, then a Safaricom/Airtel prefix
/// digit (7 or 1), then eight more digits.
static KENYAN_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^254[17]\d{8}$").expect("valid phone pattern"));

pub const INVALID_PHONE_MESSAGE: &str =
    "Please enter a valid Kenyan phone number starting with 254";

/// How strictly the flow checks the payer's phone number before dispatching
/// a payment request.
///
/// Both variants exist in production: the strict one guards the STK push
/// against numbers the carrier would reject, while the lenient one takes any
/// non-empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    #[default]
    Strict,
    Lenient,
}

impl ValidationPolicy {
    pub fn validate(&self, phone: &str) -> Result<(), BookingError> {
        match self {
            ValidationPolicy::Strict => {
                if KENYAN_MOBILE.is_match(phone) {
                    Ok(())
                } else {
                    Err(BookingError::ValidationError(
                        INVALID_PHONE_MESSAGE.to_string(),
                    ))
                }
            }
            ValidationPolicy::Lenient => {
                if phone.trim().is_empty() {
                    Err(BookingError::ValidationError(
                        "Phone number is required".to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Loose numeric coercion for the guest-count form field.
///
/// Leading ASCII digits are taken ("3abc" parses as 3); anything that yields
/// no digits, or zero, falls back to a single guest.
pub fn parse_guest_count(raw: &str) -> u32 {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(n) if n >= 1 => n,
        _ => 1,
    }
}

/// One reservation attempt, built field-by-field from the booking form and
/// consumed exactly once by the confirmation flow.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BookingRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub phone: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Used as a per-unit price multiplier, not an occupancy check.
    /// Values below 1 are floored to a single guest when pricing.
    pub guests: u32,
    /// Per-night rate of the selected room.
    pub unit_price: Decimal,
}

impl BookingRequest {
    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.guests.max(1))
    }
}

/// The receipt data handed to the notification service after a captured
/// payment. Mirrors what the confirmation screen shows the customer.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct ReceiptSummary {
    pub customer_name: String,
    pub phone: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_price: Decimal,
    pub confirmation_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(guests: u32, unit_price: Decimal) -> BookingRequest {
        BookingRequest {
            customer_name: "Asha Mwangi".to_string(),
            customer_email: "asha@example.com".to_string(),
            phone: "254712345678".to_string(),
            check_in: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 9, 5).unwrap(),
            guests,
            unit_price,
        }
    }

    #[test]
    fn test_strict_policy_accepts_kenyan_numbers() {
        let policy = ValidationPolicy::Strict;
        assert!(policy.validate("254712345678").is_ok());
        assert!(policy.validate("254112345678").is_ok());
    }

    #[test]
    fn test_strict_policy_rejects_everything_else() {
        let policy = ValidationPolicy::Strict;
        for phone in [
            "0712345678",   // missing country code
            "254812345678", // bad prefix digit
            "25471234567",  // too short
            "2547123456789",
            "+254712345678",
            "",
        ] {
            let err = policy.validate(phone).unwrap_err();
            assert_eq!(err.to_string(), INVALID_PHONE_MESSAGE, "phone: {phone:?}");
        }
    }

    #[test]
    fn test_lenient_policy_accepts_any_non_empty_string() {
        let policy = ValidationPolicy::Lenient;
        assert!(policy.validate("0712345678").is_ok());
        assert!(policy.validate("+33 6 12 34 56 78").is_ok());
        assert!(policy.validate("").is_err());
        assert!(policy.validate("   ").is_err());
    }

    #[test]
    fn test_total_price_is_rate_times_guests() {
        assert_eq!(request(1, dec!(27000)).total_price(), dec!(27000));
        assert_eq!(request(2, dec!(27000)).total_price(), dec!(54000));
        assert_eq!(request(10, dec!(1250.50)).total_price(), dec!(12505.00));
    }

    #[test]
    fn test_total_price_floors_zero_guests_to_one() {
        assert_eq!(request(0, dec!(27000)).total_price(), dec!(27000));
    }

    #[test]
    fn test_guest_count_loose_parsing() {
        assert_eq!(parse_guest_count("3"), 3);
        assert_eq!(parse_guest_count("10"), 10);
        assert_eq!(parse_guest_count("3abc"), 3);
        assert_eq!(parse_guest_count(" 42 "), 42);
    }

    #[test]
    fn test_guest_count_falls_back_to_one() {
        assert_eq!(parse_guest_count(""), 1);
        assert_eq!(parse_guest_count("abc"), 1);
        assert_eq!(parse_guest_count("0"), 1);
    }
}
