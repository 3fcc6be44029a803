pub mod backends;
pub mod calls;
