//! Slide tree passes, in pipeline order.
//!
//! - `comments`: root comments become page directives, trailing comments
//!   annotate their block.
//! - `split`: partitions the page at split markers.
//! - `image`: inline image styles and composited background layers.
//! - `code`: diagram containers and highlight placeholders.
//! - `steps`: reveal-step normalisation and the page step registry.

/// Comment-directive pass.
pub mod comments;
/// Code and diagram containers.
pub mod code;
/// Image styling and background layers.
pub mod image;
/// Split-layout partitions.
pub mod split;
/// Reveal steps.
pub mod steps;
