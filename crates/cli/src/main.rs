//! `planreel` -- render a personalized plan video from the command line.
//!
//! Reads the customer's details from the environment, builds the video
//! payload for the selected plan, submits it to the render service, and
//! follows the job until it settles. On success the output URL is
//! printed to stdout; everything else goes to the log.
//!
//! # Environment variables
//!
//! | Variable            | Required       | Default  | Description                                          |
//! |---------------------|----------------|----------|------------------------------------------------------|
//! | `RENDER_API_URL`    | yes            | --       | Render service base URL, e.g. `https://render.host`  |
//! | `RENDER_API_KEY`    | yes            | --       | Bearer token for the render service                  |
//! | `PLAN`              | yes            | --       | `secure-savings`, `secure-life`, or `goal-maximizer` |
//! | `CUSTOMER_NAME`     | yes            | --       | Customer name shown in the video                     |
//! | `PREMIUM_AMOUNT`    | no             | `100000` | Annual premium in rupees                             |
//! | `TENURE_YEARS`      | no             | `10`     | Premium payment term in years                        |
//! | `CHILD_NAME`        | goal plan only | --       | Child's name for the goal video                      |
//! | `CUSTOMER_AGE`      | goal plan only | --       | Customer's age for the goal video                    |
//! | `POLL_INTERVAL_MS`  | no             | `2000`   | Delay between status polls                           |
//! | `POLL_RETRY_BUDGET` | no             | `3`      | Tolerated consecutive poll failures                  |

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planreel_core::form::{FormInput, PlanKind};
use planreel_jobs::{JobManager, JobPhase, PollConfig};
use planreel_render::RenderApi;

/// Default annual premium when `PREMIUM_AMOUNT` is unset.
const DEFAULT_PREMIUM_AMOUNT: u64 = 100_000;

/// Default premium term when `TENURE_YEARS` is unset.
const DEFAULT_TENURE_YEARS: u32 = 10;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planreel_cli=info,planreel_jobs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_url = require_env("RENDER_API_URL");
    let api_key = require_env("RENDER_API_KEY");

    let plan = match PlanKind::parse(&require_env("PLAN")) {
        Ok(plan) => plan,
        Err(err) => {
            tracing::error!(error = %err, "PLAN is not a recognized plan");
            std::process::exit(1);
        }
    };

    let input = FormInput {
        plan,
        customer_name: require_env("CUSTOMER_NAME"),
        premium_amount: env_or("PREMIUM_AMOUNT", DEFAULT_PREMIUM_AMOUNT),
        tenure_years: env_or("TENURE_YEARS", DEFAULT_TENURE_YEARS),
        child_name: std::env::var("CHILD_NAME").ok(),
        customer_age: std::env::var("CUSTOMER_AGE")
            .ok()
            .and_then(|v| v.parse().ok()),
    };

    let defaults = PollConfig::default();
    let config = PollConfig {
        interval: Duration::from_millis(env_or(
            "POLL_INTERVAL_MS",
            defaults.interval.as_millis() as u64,
        )),
        retry_budget: env_or("POLL_RETRY_BUDGET", defaults.retry_budget),
    };

    tracing::info!(
        api_url = %api_url,
        plan = input.plan.as_str(),
        poll_interval_ms = config.interval.as_millis() as u64,
        "Starting planreel",
    );

    let service = Arc::new(RenderApi::new(api_url, api_key));
    let manager = JobManager::new(service, config);
    let mut events = manager.subscribe();

    if let Err(err) = manager.submit(&input).await {
        tracing::error!(error = %err, "Could not submit the render job");
        std::process::exit(1);
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = events.recv() => {
                let view = match event {
                    Ok(view) => view,
                    Err(err) => {
                        tracing::error!(error = %err, "Lost the job event stream");
                        std::process::exit(1);
                    }
                };
                tracing::info!(
                    phase = view.phase.as_str(),
                    progress = view.progress,
                    job_id = view.job_id.as_deref().unwrap_or("-"),
                    "Job status changed",
                );
                match view.phase {
                    JobPhase::Finished => {
                        if let Some(url) = view.output_url.as_deref() {
                            println!("{url}");
                        }
                        return;
                    }
                    JobPhase::Failed => {
                        tracing::error!(
                            error = view.error.as_deref().unwrap_or("unknown error"),
                            "Render job failed",
                        );
                        std::process::exit(1);
                    }
                    _ => {}
                }
            }
            () = &mut shutdown => {
                tracing::info!("Abandoning the render job");
                let _ = manager.cancel().await;
                manager.shutdown().await;
                return;
            }
        }
    }
}

/// Read a required environment variable or exit.
fn require_env(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| {
        tracing::error!("{name} environment variable is required");
        std::process::exit(1);
    })
}

/// Read an optional environment variable, falling back to `default` when
/// unset or unparsable.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Wait for a termination signal.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the job is
/// abandoned cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), abandoning render job");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, abandoning render job");
        }
    }
}
