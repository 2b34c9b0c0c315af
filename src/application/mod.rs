//! Application layer - use cases orchestrating the domain
//!
//! Services validate requests, enforce ownership and talk to storage through
//! the outbound ports. They never touch HTTP types.

pub mod dto;
pub mod errors;
pub mod ports;
pub mod services;
