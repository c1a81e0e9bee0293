//! Utility functions shared by the pipeline stages
pub mod math;
pub mod io;

// Re-export commonly used utilities
pub use math::*;
pub use io::*;
