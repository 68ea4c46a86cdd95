//! API Module
//!
//! HTTP clients for the backend nodes the gateway fronts.

mod node;

pub use node::*;
