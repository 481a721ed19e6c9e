//! URL handling module for Link-Spider
//!
//! This module provides href normalization against the page it was found on
//! and the scope checks that decide which links may become pages.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{has_scheme, normalize_href};
pub use scope::{derive_scope, in_scope, SeedScope, FALLBACK_ROOT};
