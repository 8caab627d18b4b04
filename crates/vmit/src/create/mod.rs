//! The `vmit create` subcommand tree.

pub mod instancetype;
pub mod params;
