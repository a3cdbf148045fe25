//! Example-site stylesheet pipeline for mvsass.
//!
//! Compiles the demo site's SCSS with the library on the load path, then
//! writes optimized and beautified variants of each stylesheet.

pub mod compile;
pub mod optimize;
pub mod selector;

pub use compile::{
    clean_css_dirs, CompiledSheet, ExampleCompiler, ExampleConfig, ExampleError, OutputStyle,
};
pub use optimize::CssPipeline;
pub use selector::{parents_selector, ListSeparator, ResolvedSelector, SassValue, SelectorContext};
