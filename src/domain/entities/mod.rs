mod design;
mod favorite;
mod furniture;
mod project;
mod user;

pub use design::{Design, PlacedObject, TransformPatch, Vector3, Vector3Patch};
pub use favorite::{Favorite, RecentlyViewed};
pub use furniture::FurnitureItem;
pub use project::{CollaboratorRole, Project, ProjectAccess};
pub use user::{PublicProfile, UserProfile, UserStats};

/// Collection names and sub-collection paths
pub mod collections {
    pub const USERS: &str = "users";
    pub const PROJECTS: &str = "projects";
    pub const DESIGNS: &str = "designs";
    pub const FURNITURE_ITEMS: &str = "furniture_items";
    pub const AUTH_ACCOUNTS: &str = "auth_accounts";
    /// One document per normalized email, keyed by the email itself
    pub const AUTH_EMAILS: &str = "auth_emails";
    pub const PASSWORD_RESETS: &str = "password_resets";

    pub fn favorites(uid: &str) -> String {
        format!("{}/{}/favorites", USERS, uid)
    }

    pub fn recently_viewed(uid: &str) -> String {
        format!("{}/{}/recently_viewed", USERS, uid)
    }
}
