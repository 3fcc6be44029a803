pub mod actions;
pub mod flow;
pub mod policy;
pub mod proxy;
