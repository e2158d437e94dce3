//! Module event distribution.

pub mod bus;
