//! vendir: private vendoring of Go dependencies.
//!
//! This crate provides the CLI binary for vendir.
//!
//! ## Modules
//!
//! - `cli` - Command implementations
//! - `output` - Text and JSON rendering

pub mod cli;
pub mod output;

// Re-export core types for convenience
pub use vendir_core::error::{OutputErrorCode, VendirError, VendirResult};
pub use vendir_core::toolchain::{GoToolchain, ToolchainConfig};
pub use vendir_core::vendor::{VendorOptions, VendorReport};
