//! LofiZone library
//!
//! Core of the LofiZone study companion: the quest hierarchy, the session
//! state machine and the focus tools around them. A UI shell builds an
//! [`app::AppState`] once and calls into its services.

pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod services;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Calling it again is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lofizone=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
