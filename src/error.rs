use thiserror::Error;

pub type Result<T> = std::result::Result<T, BookingError>;

/// Faults raised by the flow and its collaborators.
///
/// A gateway *decline* is not an error: it is a regular outcome
/// (`PaymentOutcome::Failed`). Only transport-level faults surface here,
/// and the flow normalizes them into terminal states rather than
/// propagating them to the caller.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{0}")]
    ValidationError(String),
    #[error("payment gateway fault: {0}")]
    GatewayFault(String),
    #[error("notification dispatch fault: {0}")]
    NotificationFailure(String),
}
