//! Request interception: maintenance gate and audit trail

mod audit;
mod maintenance;
pub mod sanitize;

pub use audit::audit_requests;
pub use maintenance::maintenance_gate;
