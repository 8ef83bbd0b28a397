//! timepunch web app: clock front end, OAuth pages and callback, timesheet
//! forwarder.
//!
//! The server wires the token lifecycle from `timepunch-auth` into five
//! routes:
//!
//! - `GET /` — the clock front end
//! - `GET /auth` — authorization page (callback URL + authorization URL)
//! - `GET /usercallback` — OAuth callback, exchanges the code for tokens
//! - `POST /api/clock` — forwards clock actions to the timesheet backend
//! - `GET /healthz` — liveness probe

pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod pages;
pub mod routes;
pub mod secret;
pub mod timesheet;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use identity::{HeaderIdentity, UserIdentity};
pub use routes::{AppState, build_router};
pub use timesheet::TimesheetClient;
