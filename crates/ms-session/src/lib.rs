//! Connectivity session for the plant device network.
//!
//! The session manager is the single writer of the process-wide
//! [`ConnectionState`] and of every [`DeviceRecord`] status. It talks to the
//! remote connectivity service through the OPC endpoints and keeps a
//! conservative view: whenever the service cannot be read, everything is
//! considered disconnected until the next successful poll.
//!
//! # Polling
//!
//! [`SessionManager::spawn_polling`] starts a single-flight loop: one status
//! query, then a fixed delay measured from its completion, then the next
//! query. Dropping or cancelling the returned [`PollHandle`] stops the loop
//! and prevents an in-flight query from writing state.

pub mod device;
pub mod error;
pub mod manager;
pub mod poll;
pub mod state;
pub mod status;
pub mod telemetry;

pub use device::{DeviceKind, DeviceRecord, DeviceStatus, default_devices};
pub use error::{SessionError, SessionResult};
pub use manager::SessionManager;
pub use poll::{CancelFlag, PollConfig, PollHandle, PollStats};
pub use state::{ConnectionState, SessionSnapshot};
pub use status::PollOutcome;
pub use telemetry::ZoneTemperatures;
