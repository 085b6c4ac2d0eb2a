//! API request handlers

mod catalog;
mod faults;
mod health;

pub use catalog::*;
pub use faults::*;
pub use health::*;
