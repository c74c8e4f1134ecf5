//! Stream pacing utilities for snapshot subscriptions.

mod pace;

pub use pace::{PaceExt, Paced};
