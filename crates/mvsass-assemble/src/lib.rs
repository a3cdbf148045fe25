//! Ordered fragment assembler for the mvsass stylesheet library.
//!
//! Concatenates the library's SCSS fragments into one distributable file in the
//! order given by a manifest, and copies auxiliary helper files next to it.

pub mod assembler;
pub mod config;
pub mod error;
pub mod fragment;
pub mod manifest;
pub mod stage;

pub use assembler::{clean_outputs, format_size, AssembleReport, Assembler};
pub use config::{AssembleConfig, UnlistedPolicy};
pub use error::AssembleError;
pub use fragment::Fragment;
pub use manifest::OrderManifest;
