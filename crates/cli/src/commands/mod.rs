//! CLI command implementations

pub mod assess;
pub mod guide;
pub mod status;
