pub mod connection;
pub mod factory;

pub const DEFAULT_POOL_NAME: &'static str = "default";
