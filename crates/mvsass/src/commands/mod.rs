//! CLI subcommands.

pub mod build;
pub mod clean;
pub mod example;
pub mod host;
pub mod init;
