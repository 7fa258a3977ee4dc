//! Display formatting shared by the table view, the summary tile and the CSV export.
//!
//! Every on-screen and exported value goes through these functions so that the
//! export reproduces the table byte for byte.

pub mod decimal;
pub mod num;
pub mod time;
