//! Primitive effects performed by [`SystemHost`](super::SystemHost).

pub mod cmd;
pub mod fetch;
