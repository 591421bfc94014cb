//! Command implementations for the dumpmirror CLI

pub mod completions;
pub mod init;
pub mod service;
pub mod status;
pub mod sync;
pub mod version;
