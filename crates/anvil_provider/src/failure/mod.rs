pub mod categorizer;
pub mod inspector;
pub mod rate_limit;
