//! # Event subscribers for the registry.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and, behind the `logging` feature, the [`LogWriter`] printer.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Registry / task thread / reaper ── publish(Event) ──► Bus
//!                                                          │
//!                                       subscriber listener (driver runtime)
//!                                                          │
//!                                                    SubscriberSet
//!                                               ┌─────────┼─────────┐
//!                                               ▼         ▼         ▼
//!                                           LogWriter   Metrics   Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
