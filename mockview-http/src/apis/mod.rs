pub mod health;
pub mod interview;
pub mod speech;
