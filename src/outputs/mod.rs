//! Output writers for runs that do not publish.
//!
//! - [`json`]: Writes assembled articles and their images for dry runs

pub mod json;
