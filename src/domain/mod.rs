pub mod authorization;
pub mod entities;
pub mod errors;
