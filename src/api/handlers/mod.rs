pub mod auth;
pub mod designs;
pub mod favorites;
pub mod furniture;
pub mod health;
pub mod projects;
pub mod users;

#[cfg(test)]
mod tests;

pub use health::{health_handler, readiness_handler};
