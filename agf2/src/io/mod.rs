//! Input/Output operations for AGF2 calculations
//!
//! This module handles logging setup and the final report.

mod output;

pub use output::{print_results, setup_output};
