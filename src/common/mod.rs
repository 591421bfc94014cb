//! Common utility modules for shared functionality across the codebase.

pub mod fs;
pub mod size;
