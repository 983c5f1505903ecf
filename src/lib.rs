//! Bird Site library.
//!
//! Converts a personal Twitter data export (a zip archive of JavaScript-wrapped
//! JSON) into a static website: one page per post, month, year and all-time
//! index pages, and a local copy of the referenced media.

#![allow(clippy::needless_raw_string_hashes)]

pub mod archive;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod site;
