//! ms-core: shared foundation for the metallisense console.
//!
//! Contains:
//! - ids (stable device identifiers)
//! - element (canonical chemical-element symbols)
//! - numeric (lenient coercion of operator input + clamps)
//! - rng (seeded deterministic PRNG for synthetic values)
//! - notify (transient operator notifications)
//! - error (shared error types)

pub mod element;
pub mod error;
pub mod ids;
pub mod notify;
pub mod numeric;
pub mod rng;

pub use element::ElementSymbol;
pub use error::CoreError;
pub use ids::DeviceId;
pub use notify::{Notification, NotificationLevel, Notifications};
pub use numeric::*;
pub use rng::Xorshift64;
