pub mod core;
pub mod observability;
