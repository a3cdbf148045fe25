//! Development server for the mvsass example site.
//!
//! Recompiles the example stylesheets whenever their sources change and hosts
//! the example directory over HTTP.

pub mod listing;
pub mod server;
pub mod watcher;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
