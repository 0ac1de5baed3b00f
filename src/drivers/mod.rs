//! Indicator driver, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod indicator;
