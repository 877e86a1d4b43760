//! sasspipe-lib: Dart Sass integration for asset pipelines.
//!
//! - [`resolve`]: expand configured paths and globs into Sass sources
//! - [`binary`]: download and cache the Dart Sass executable
//! - [`options`]: translate build options into compiler flags
//! - [`build`]: run the compiler, one-shot or watching
//! - [`asset`]: serve compiled CSS to a pipeline in place of `.scss` sources

pub mod asset;
pub mod binary;
pub mod build;
pub mod config;
pub mod consts;
pub mod hooks;
pub mod options;
pub mod platform;
pub mod reporter;
pub mod resolve;
#[cfg(test)]
mod util;
