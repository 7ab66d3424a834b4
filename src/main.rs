use booking_flow::application::flow::{BookingConfirmationFlow, FlowOutcome, FlowState};
use booking_flow::domain::booking::{BookingRequest, ValidationPolicy, parse_guest_count};
use booking_flow::infrastructure::simulated::{
    GatewayConfig, ResolutionPolicy, SimulatedNotificationService, SimulatedPaymentGateway,
};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum)]
enum PaymentMode {
    Probabilistic,
    Deterministic,
}

#[derive(Clone, Copy, ValueEnum)]
enum ValidationMode {
    Strict,
    Lenient,
}

/// Runs one simulated booking confirmation and prints the outcome.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payer phone number (Kenyan MSISDN, e.g. 254712345678)
    #[arg(long)]
    phone: String,

    #[arg(long, default_value = "Walk-in guest")]
    name: String,

    #[arg(long, default_value = "guest@example.com")]
    email: String,

    /// Guest count; loose numeric input is coerced ("3abc" counts as 3)
    #[arg(long, default_value = "1")]
    guests: String,

    /// Per-night rate
    #[arg(long)]
    rate: Decimal,

    #[arg(long, default_value = "2026-09-01")]
    check_in: NaiveDate,

    #[arg(long, default_value = "2026-09-05")]
    check_out: NaiveDate,

    /// Payment resolution policy
    #[arg(long, value_enum, default_value = "probabilistic")]
    payment: PaymentMode,

    /// Phone validation policy
    #[arg(long, value_enum, default_value = "strict")]
    validation: ValidationMode,

    /// Seed the gateway RNG for a reproducible outcome
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the simulated network and PIN-entry delays
    #[arg(long)]
    fast: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let policy = match cli.payment {
        PaymentMode::Probabilistic => ResolutionPolicy::Probabilistic,
        PaymentMode::Deterministic => ResolutionPolicy::Deterministic,
    };
    let config = if cli.fast {
        GatewayConfig::instant(policy)
    } else {
        GatewayConfig::new(policy)
    };
    let gateway = match cli.seed {
        Some(seed) => SimulatedPaymentGateway::with_seed(config, seed),
        None => SimulatedPaymentGateway::new(config),
    };
    let notifier = if cli.fast {
        SimulatedNotificationService::instant()
    } else {
        SimulatedNotificationService::new()
    };
    let validation = match cli.validation {
        ValidationMode::Strict => ValidationPolicy::Strict,
        ValidationMode::Lenient => ValidationPolicy::Lenient,
    };

    let request = BookingRequest {
        customer_name: cli.name,
        customer_email: cli.email,
        phone: cli.phone,
        check_in: cli.check_in,
        check_out: cli.check_out,
        guests: parse_guest_count(&cli.guests),
        unit_price: cli.rate,
    };

    let flow = Arc::new(BookingConfirmationFlow::new(
        Box::new(gateway),
        Box::new(notifier),
        validation,
    ));

    // Mirror what a UI would do with the watch channel: show a waiting
    // indicator while the payer authorizes on their handset.
    let mut states = flow.subscribe();
    let watcher = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            match state {
                FlowState::PaymentPending => {
                    eprintln!("Waiting for payment authorization on the handset...")
                }
                FlowState::Notifying => eprintln!("Sending receipt..."),
                _ => {}
            }
        }
    });

    let cancel = CancellationToken::new();
    let shutdown = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let outcome = flow.submit(&request, &cancel).await;
    shutdown.abort();
    drop(flow);
    // Give the watcher a moment to drain, then stop it.
    let _ = tokio::time::timeout(Duration::from_millis(50), watcher).await;

    match outcome {
        FlowOutcome::Confirmed(confirmation) => {
            println!("Booking confirmed");
            println!(
                "{}",
                serde_json::to_string_pretty(&confirmation).into_diagnostic()?
            );
        }
        FlowOutcome::NotifyFailed {
            message,
            confirmation,
        } => {
            println!("{message}");
            println!(
                "{}",
                serde_json::to_string_pretty(&confirmation).into_diagnostic()?
            );
        }
        FlowOutcome::ValidationFailed { message } | FlowOutcome::PaymentFailed { message } => {
            println!("{message}");
        }
        FlowOutcome::AlreadyInFlight => println!("A submission is already in flight"),
        FlowOutcome::Abandoned => println!("Booking abandoned"),
    }

    Ok(())
}
