//! sea-orm entities for the companion's persistent log.

pub mod messages;
