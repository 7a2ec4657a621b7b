//! School Finance is a web app for keeping track of a school's revenues,
//! expenses and emergency reserve.
//!
//! This library provides a JSON API for the finances and a couple of
//! server-rendered HTML pages. Requests are authenticated with a signed,
//! stateless session cookie.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod audit;
mod auth;
mod balance;
mod config;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod error;
mod expense;
mod financial_settings;
mod html;
mod logging;
mod money;
mod not_found;
mod password;
mod payment_method;
mod period;
mod revenue;
mod routing;
mod session;
mod text_enum;
mod timestamp;
mod timezone;
pub mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use config::{Environment, ServerArgs, ServerConfig};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use session::SessionKey;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
