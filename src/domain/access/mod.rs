//! Access domain - per-request authorization outcomes

mod decision;

pub use decision::AuthDecision;
