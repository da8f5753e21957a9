use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::api::errors::ErrorBody;
use crate::api::handlers::{
    auth, designs, favorites, furniture, health, projects, users,
};
use crate::api::middleware::FieldError;
use crate::api::response::MessageResponse;
use crate::application::dto::{
    AddDesignObjectRequest, AuthSession, BatchUsersRequest, ChangePasswordRequest, CreatedId,
    DesignInput, EmailRequest, ItemRequest, LoginRequest, NewFurnitureRequest, ProjectInput,
    ResetPasswordRequest, ShareProjectRequest, SignupRequest, UpdatePreferenceRequest,
    UpdateProfileRequest,
};
use crate::application::use_cases::Collaborator;
use crate::domain::authorization::Identity;
use crate::domain::entities::{
    CollaboratorRole, Design, FurnitureItem, PlacedObject, Project, PublicProfile,
    TransformPatch, UserProfile, UserStats, Vector3, Vector3Patch,
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI specification for the RoomieLab API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "RoomieLab API",
        version = "1.0.0",
        description = "Projects, designs and furniture catalog for AR room planning"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    modifiers(&BearerAuth),
    paths(
        health::health_handler,
        health::readiness_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::forgot_password_handler,
        auth::reset_password_handler,
        auth::get_profile_handler,
        auth::update_profile_handler,
        auth::delete_account_handler,
        auth::change_password_handler,
        auth::verify_token_handler,
        users::get_profile_handler,
        users::update_profile_handler,
        users::get_preferences_handler,
        users::replace_preferences_handler,
        users::set_preference_handler,
        users::last_login_handler,
        users::stats_handler,
        users::search_handler,
        users::by_email_handler,
        users::batch_handler,
        users::exists_handler,
        users::get_user_handler,
        users::delete_account_handler,
        furniture::list_furniture_handler,
        furniture::featured_handler,
        furniture::search_furniture_handler,
        furniture::by_room_handler,
        furniture::get_furniture_handler,
        furniture::create_furniture_handler,
        furniture::recently_viewed_handler,
        furniture::track_view_handler,
        favorites::list_favorites_handler,
        favorites::add_favorite_handler,
        favorites::remove_favorite_handler,
        favorites::check_favorite_handler,
        projects::list_projects_handler,
        projects::create_project_handler,
        projects::get_project_handler,
        projects::update_project_handler,
        projects::delete_project_handler,
        projects::list_items_handler,
        projects::add_item_handler,
        projects::remove_item_handler,
        projects::share_project_handler,
        projects::collaborators_handler,
        designs::list_designs_handler,
        designs::create_design_handler,
        designs::designs_by_project_handler,
        designs::get_design_handler,
        designs::update_design_handler,
        designs::delete_design_handler,
        designs::add_object_handler,
        designs::update_object_handler,
        designs::remove_object_handler,
    ),
    components(
        schemas(
            ErrorBody,
            FieldError,
            MessageResponse,
            SignupRequest,
            LoginRequest,
            EmailRequest,
            ResetPasswordRequest,
            ChangePasswordRequest,
            AuthSession,
            UpdateProfileRequest,
            UpdatePreferenceRequest,
            BatchUsersRequest,
            ProjectInput,
            ItemRequest,
            ShareProjectRequest,
            DesignInput,
            AddDesignObjectRequest,
            NewFurnitureRequest,
            CreatedId,
            Identity,
            UserProfile,
            PublicProfile,
            UserStats,
            Project,
            CollaboratorRole,
            Collaborator,
            Design,
            PlacedObject,
            TransformPatch,
            Vector3,
            Vector3Patch,
            FurnitureItem,
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "auth", description = "Accounts, sessions and passwords"),
        (name = "users", description = "Profiles, preferences and user lookup"),
        (name = "furniture", description = "Furniture catalog and view history"),
        (name = "favorites", description = "Per-user favorite items"),
        (name = "projects", description = "Projects, items and collaborators"),
        (name = "designs", description = "Room designs and placed objects")
    )
)]
pub struct ApiDoc;
