//! HD44780 character LCD module.
//!
//! The classic 16x2 (and friends) character display controller, driven over
//! GPIO in 4-bit or 8-bit mode.

pub mod driver;
