//! ms-app: console service layer shared by every front end.
//!
//! Wires the session manager, grade schemas, batch form, synthetic readings
//! and prediction orchestrator into one [`Console`], turns their outcomes
//! into operator notifications and loads the [`ConsoleConfig`].

pub mod config;
pub mod console;
pub mod error;

pub use config::{ConsoleConfig, DeviceConfig, SyntheticSourceKind, load_config};
pub use console::{Console, ConsoleView};
pub use error::{AppError, AppResult};
