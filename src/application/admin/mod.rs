//! Services evaluating the post resource against the repositories.

pub mod posts;
pub mod stats;
pub mod tags;
