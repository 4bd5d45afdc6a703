pub mod executor;
pub mod proxy;
