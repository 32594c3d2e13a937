//! # blendget Core Library
//!
//! This crate contains the building blocks of `blendget` – a multiplatform
//! downloader for portable Blender releases.
//!
//! `blendget` resolves a version token ("2.93.4", "2.9", "stable", "lts",
//! "nightly") against the official release listings, downloads the matching
//! archive into a local cache with progress feedback, and can extract or
//! mount it and print the path to the Blender executable.
//!
//! The library is built for the `blendget` CLI, but the pieces compose on
//! their own as well.
//!
//! ## Modules Overview
//! - [`listing`] – Fetching and parsing channel listings into release entries
//! - [`resolve`] – Matching version tokens against parsed entries
//! - [`version`] – Filename version parsing and token/family matching
//! - [`platform`] – Platform/bit-width model and host introspection
//! - [`download`] – Streaming archives into the cache
//! - [`extract`] – Unpacking or mounting archives, locating the executable
//! - [`config`] – Optional user configuration (mirrors, cache dir, LTS list)
//! - [`error`] – The crate-wide error taxonomy
//! - [`global`] – Platform directories and the persistent download cache

pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod global;
pub mod listing;
pub mod platform;
pub mod resolve;
pub mod version;

pub use config::*;
pub use download::*;
pub use error::*;
pub use extract::*;
pub use global::cache::*;
pub use listing::*;
pub use platform::*;
pub use resolve::*;
pub use version::*;
