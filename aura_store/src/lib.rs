#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Message store implementations.
//!
//! - [`DatabaseMessageStore`]: sea-orm backed, sqlite or postgres
//! - [`InMemoryMessageStore`]: process-local, for tests and throwaway sessions

mod database;
mod memory;

pub use aura_core::MessageStore;
pub use database::DatabaseMessageStore;
pub use memory::InMemoryMessageStore;
