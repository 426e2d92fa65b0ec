//! Layered configuration: built-in defaults, an optional TOML file, then
//! environment variables.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
