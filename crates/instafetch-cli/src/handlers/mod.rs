//! Command handlers, one per subcommand.

pub mod check;
pub mod clean;
pub mod fetch;
pub mod serve;
