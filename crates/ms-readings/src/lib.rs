//! Synthetic composition readings.
//!
//! A [`SyntheticSource`] produces a composition for a grade; the
//! [`ReadingGenerator`] writes it into the batch form, raw-metal or scrap
//! family, filtered by the active grade schema.

pub mod error;
pub mod generator;
pub mod mode;
pub mod source;

pub use error::{ReadingError, ReadingResult};
pub use generator::{MixedReport, ReadingGenerator, ReadingOutcome, ReadingReport};
pub use mode::ReadingMode;
pub use source::{RemoteSyntheticSource, SeededSyntheticSource, SyntheticReading, SyntheticSource};
