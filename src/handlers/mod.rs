pub mod health;

pub use health::{health_check, ready_check};
