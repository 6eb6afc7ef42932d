//! Per-session sample collection state machine

mod controller;

#[cfg(test)]
mod controller_tests;

pub use controller::*;
