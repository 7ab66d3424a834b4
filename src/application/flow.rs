use crate::domain::booking::{BookingRequest, ReceiptSummary, ValidationPolicy};
use crate::domain::payment::{Confirmation, PAYMENT_DECLINED_MESSAGE, PaymentOutcome, ReceiptAck};
use crate::domain::ports::{NotificationServiceBox, PaymentGatewayBox};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const RECEIPT_FAILED_MESSAGE: &str =
    "Booking completed but confirmation email failed to send.";

/// Observable state of one booking attempt, published on a watch channel so
/// a UI can render waiting indicators while the flow is suspended.
#[derive(Debug, PartialEq, Clone, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Validating,
    FailedValidation {
        message: String,
    },
    PaymentPending,
    PaymentFailed {
        message: String,
    },
    PaymentSuccess,
    Notifying,
    /// Partial success: payment is captured and stands, only the receipt
    /// dispatch failed.
    NotifyFailed {
        message: String,
        confirmation: Confirmation,
    },
    Confirmed {
        confirmation: Confirmation,
    },
}

/// Terminal result of `submit`, mirroring the terminal states above.
#[derive(Debug, PartialEq, Clone)]
pub enum FlowOutcome {
    Confirmed(Confirmation),
    ValidationFailed { message: String },
    PaymentFailed { message: String },
    NotifyFailed {
        message: String,
        confirmation: Confirmation,
    },
    /// A submission was already in flight; this one was not started.
    AlreadyInFlight,
    /// The hosting dialog was dismissed mid-flight. No state was published
    /// after the cancellation was observed.
    Abandoned,
}

/// Orchestrates one reservation attempt: phone validation, a simulated
/// push-payment request/response cycle, and receipt dispatch.
///
/// ```text
/// Idle -> Validating -> FailedValidation
///                    -> PaymentPending -> PaymentFailed
///                                      -> PaymentSuccess -> Notifying -> Confirmed
///                                                                     -> NotifyFailed
/// ```
///
/// The flow owns its collaborators behind ports, so tests and the demo
/// binary can swap gateways without touching the sequencing.
pub struct BookingConfirmationFlow {
    gateway: PaymentGatewayBox,
    notifier: NotificationServiceBox,
    validation: ValidationPolicy,
    state: watch::Sender<FlowState>,
    in_flight: AtomicBool,
}

impl BookingConfirmationFlow {
    pub fn new(
        gateway: PaymentGatewayBox,
        notifier: NotificationServiceBox,
        validation: ValidationPolicy,
    ) -> Self {
        Self {
            gateway,
            notifier,
            validation,
            state: watch::Sender::new(FlowState::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Subscribes to state transitions. The receiver sees every transition
    /// published after this call.
    pub fn subscribe(&self) -> watch::Receiver<FlowState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FlowState {
        self.state.borrow().clone()
    }

    /// Re-entry point for a fresh attempt: clears any previous attempt's
    /// message and confirmation code. Ignored while a submission is in
    /// flight.
    pub fn reset(&self) {
        if self.in_flight.load(Ordering::Acquire) {
            warn!("reset ignored: submission in flight");
            return;
        }
        self.transition(FlowState::Idle);
    }

    /// Runs one attempt to a terminal outcome. Re-entrant calls while an
    /// attempt is pending are rejected, never interleaved. Every suspension
    /// point races `cancel`; once the token fires, no further state is
    /// published.
    pub async fn submit(
        &self,
        request: &BookingRequest,
        cancel: &CancellationToken,
    ) -> FlowOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("submission rejected: another attempt is in flight");
            return FlowOutcome::AlreadyInFlight;
        }
        // Release the gate even if the submit future is dropped mid-flight.
        let _guard = InFlightGuard(&self.in_flight);
        self.run(request, cancel).await
    }

    async fn run(&self, request: &BookingRequest, cancel: &CancellationToken) -> FlowOutcome {
        if cancel.is_cancelled() {
            return FlowOutcome::Abandoned;
        }
        self.transition(FlowState::Validating);
        if let Err(err) = self.validation.validate(&request.phone) {
            let message = err.to_string();
            self.transition(FlowState::FailedValidation {
                message: message.clone(),
            });
            return FlowOutcome::ValidationFailed { message };
        }

        if cancel.is_cancelled() {
            return FlowOutcome::Abandoned;
        }
        self.transition(FlowState::PaymentPending);
        let total = request.total_price();
        let payment = tokio::select! {
            _ = cancel.cancelled() => return FlowOutcome::Abandoned,
            result = self.gateway.request(&request.phone, total) => result,
        };
        let (code, completed_at) = match payment {
            Ok(PaymentOutcome::Success { code, completed_at }) => (code, completed_at),
            Ok(PaymentOutcome::Failed { message }) => {
                return self.fail_payment(message);
            }
            // A gateway that resolves to a still-pending outcome is treated
            // as an ordinary decline.
            Ok(PaymentOutcome::Pending) => {
                return self.fail_payment(PAYMENT_DECLINED_MESSAGE.to_string());
            }
            Err(err) => {
                warn!(error = %err, "gateway fault normalized to decline");
                return self.fail_payment(PAYMENT_DECLINED_MESSAGE.to_string());
            }
        };

        if cancel.is_cancelled() {
            return FlowOutcome::Abandoned;
        }
        self.transition(FlowState::PaymentSuccess);
        let confirmation = Confirmation {
            total_price: total,
            code,
            phone: request.phone.clone(),
            completed_at,
        };

        self.transition(FlowState::Notifying);
        let summary = ReceiptSummary {
            customer_name: request.customer_name.clone(),
            phone: request.phone.clone(),
            check_in: request.check_in,
            check_out: request.check_out,
            guests: request.guests,
            total_price: total,
            confirmation_code: confirmation.code.as_str().to_string(),
        };
        let ack = tokio::select! {
            _ = cancel.cancelled() => return FlowOutcome::Abandoned,
            result = self.notifier.send_receipt(&request.customer_email, &summary) => result,
        };
        match ack {
            Ok(ReceiptAck { success: true }) => {
                self.transition(FlowState::Confirmed {
                    confirmation: confirmation.clone(),
                });
                FlowOutcome::Confirmed(confirmation)
            }
            // Payment is already captured: the booking stands, the caller
            // is only told the receipt did not go out.
            Ok(ReceiptAck { success: false }) => self.fail_notification(confirmation),
            Err(err) => {
                warn!(error = %err, "receipt dispatch fault");
                self.fail_notification(confirmation)
            }
        }
    }

    fn fail_payment(&self, message: String) -> FlowOutcome {
        self.transition(FlowState::PaymentFailed {
            message: message.clone(),
        });
        FlowOutcome::PaymentFailed { message }
    }

    fn fail_notification(&self, confirmation: Confirmation) -> FlowOutcome {
        let message = RECEIPT_FAILED_MESSAGE.to_string();
        self.transition(FlowState::NotifyFailed {
            message: message.clone(),
            confirmation: confirmation.clone(),
        });
        FlowOutcome::NotifyFailed {
            message,
            confirmation,
        }
    }

    fn transition(&self, state: FlowState) {
        debug!(state = ?state, "flow transition");
        self.state.send_replace(state);
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
