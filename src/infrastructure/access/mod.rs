//! Per-request access decisions

mod gate;

pub use gate::AccessGate;
