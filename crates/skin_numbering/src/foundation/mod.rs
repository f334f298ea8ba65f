//! Foundation utilities shared by every numbering module

pub mod logging;
pub mod math;
