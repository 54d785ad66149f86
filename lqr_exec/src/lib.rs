//! # LQR planner library.
//!
//! This library allows other crates in the workspace to access items defined inside the planner
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// LQR control module - solves for the feedback gain and steers a point mass to a goal
pub mod lqr_ctrl;

/// Demo support - seeded goal sampling for the executable and benchmarks
pub mod demo;
