//! Core engine for vendir.
//!
//! This crate rewrites Go dependency trees so they can live under a private
//! import path inside a host module:
//! - Import header scanning and string literal decoding
//! - Import path classification against the standard library and host module
//! - Span-based source editing that leaves untouched bytes untouched
//! - `//go:generate` directive neutralization
//! - Include/exclude file selection
//! - Go toolchain queries (standard library, module paths, `go mod`)
//! - The copy-and-rewrite vendoring workflow
//! - Error types and exit codes

pub mod classify;
pub mod config;
pub mod edit;
pub mod error;
pub mod filter;
pub mod literal;
pub mod pattern;
pub mod scan;
pub mod source;
pub mod stdlib;
pub mod text;
pub mod toolchain;
pub mod vendor;
