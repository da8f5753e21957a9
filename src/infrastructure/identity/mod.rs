mod jwt_identity_provider;
mod password;

pub use jwt_identity_provider::{IdentitySettings, JwtIdentityProvider};
pub use password::{hash_password, verify_password};
