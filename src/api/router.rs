use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::errors::ApiError;
use crate::api::handlers::{
    auth, designs, favorites, furniture, health_handler, projects, readiness_handler, users,
};
use crate::api::middleware::{
    cors_layer_for, require_auth, ErrorHandlingConfig, ErrorHandlingLayer, RequestValidator,
};
use crate::api::openapi::ApiDoc;
use crate::application::ports::{DocumentStore, IdentityProvider};
use crate::application::use_cases::{
    AccountUseCases, DesignUseCases, FavoriteUseCases, FurnitureUseCases, ProjectUseCases,
    UserUseCases,
};
use crate::config::Config;

/// Application state container
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub validator: RequestValidator,
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub accounts: Arc<AccountUseCases>,
    pub users: Arc<UserUseCases>,
    pub projects: Arc<ProjectUseCases>,
    pub designs: Arc<DesignUseCases>,
    pub furniture: Arc<FurnitureUseCases>,
    pub favorites: Arc<FavoriteUseCases>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            validator: RequestValidator::new(config.sanitization()),
            config: Arc::new(config),
            accounts: Arc::new(AccountUseCases::new(
                Arc::clone(&store),
                Arc::clone(&identity),
            )),
            users: Arc::new(UserUseCases::new(Arc::clone(&store), Arc::clone(&identity))),
            projects: Arc::new(ProjectUseCases::new(Arc::clone(&store))),
            designs: Arc::new(DesignUseCases::new(Arc::clone(&store))),
            furniture: Arc::new(FurnitureUseCases::new(Arc::clone(&store))),
            favorites: Arc::new(FavoriteUseCases::new(Arc::clone(&store))),
            store,
            identity,
        }
    }
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route not found - {}", uri.path()))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/profile",
            get(auth::get_profile_handler).put(auth::update_profile_handler),
        )
        .route("/account", delete(auth::delete_account_handler))
        .route("/change-password", post(auth::change_password_handler))
        .route("/verify-token", get(auth::verify_token_handler))
        .route_layer(from_fn_with_state(Arc::clone(&state.identity), require_auth));

    Router::new()
        .route("/signup", post(auth::signup_handler))
        .route("/login", post(auth::login_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/forgot-password", post(auth::forgot_password_handler))
        .route("/reset-password", post(auth::reset_password_handler))
        .merge(protected)
}

fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(users::get_profile_handler).put(users::update_profile_handler),
        )
        .route(
            "/preferences",
            get(users::get_preferences_handler)
                .put(users::replace_preferences_handler)
                .patch(users::set_preference_handler),
        )
        .route("/last-login", put(users::last_login_handler))
        .route("/stats", get(users::stats_handler))
        .route("/search", get(users::search_handler))
        .route("/by-email", get(users::by_email_handler))
        .route("/batch", post(users::batch_handler))
        .route("/account", delete(users::delete_account_handler))
        .route("/{userId}/exists", get(users::exists_handler))
        .route("/{userId}", get(users::get_user_handler))
        .route_layer(from_fn_with_state(Arc::clone(&state.identity), require_auth))
}

fn furniture_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(furniture::create_furniture_handler))
        .route(
            "/user/recently-viewed",
            get(furniture::recently_viewed_handler),
        )
        .route("/user/track-view", post(furniture::track_view_handler))
        .route_layer(from_fn_with_state(Arc::clone(&state.identity), require_auth));

    Router::new()
        .route("/", get(furniture::list_furniture_handler))
        .route("/featured", get(furniture::featured_handler))
        .route("/search", get(furniture::search_furniture_handler))
        .route("/room/{roomType}", get(furniture::by_room_handler))
        .route("/{id}", get(furniture::get_furniture_handler))
        .merge(protected)
}

fn favorite_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(favorites::list_favorites_handler).post(favorites::add_favorite_handler),
        )
        .route("/{itemId}", delete(favorites::remove_favorite_handler))
        .route("/check/{itemId}", get(favorites::check_favorite_handler))
        .route_layer(from_fn_with_state(Arc::clone(&state.identity), require_auth))
}

fn project_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(projects::list_projects_handler).post(projects::create_project_handler),
        )
        .route(
            "/{projectId}",
            get(projects::get_project_handler)
                .put(projects::update_project_handler)
                .delete(projects::delete_project_handler),
        )
        .route(
            "/{projectId}/items",
            get(projects::list_items_handler).post(projects::add_item_handler),
        )
        .route(
            "/{projectId}/items/{itemId}",
            delete(projects::remove_item_handler),
        )
        .route("/{projectId}/share", post(projects::share_project_handler))
        .route(
            "/{projectId}/collaborators",
            get(projects::collaborators_handler),
        )
        .route_layer(from_fn_with_state(Arc::clone(&state.identity), require_auth))
}

fn design_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(designs::list_designs_handler).post(designs::create_design_handler),
        )
        .route(
            "/project/{projectId}",
            get(designs::designs_by_project_handler),
        )
        .route(
            "/{designId}",
            get(designs::get_design_handler)
                .put(designs::update_design_handler)
                .delete(designs::delete_design_handler),
        )
        .route("/{designId}/objects", post(designs::add_object_handler))
        .route(
            "/{designId}/objects/{objectId}",
            put(designs::update_object_handler).delete(designs::remove_object_handler),
        )
        .route_layer(from_fn_with_state(Arc::clone(&state.identity), require_auth))
}

/// Create router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let error_config = ErrorHandlingConfig::for_environment(state.config.is_production());
    let cors = cors_layer_for(&state.config);
    let body_limit = state.config.max_body_bytes;

    let api = Router::new()
        .nest("/auth", auth_routes(&state))
        .nest("/users", user_routes(&state))
        .nest("/furniture", furniture_routes(&state))
        .nest("/favorites", favorite_routes(&state))
        .nest("/projects", project_routes(&state))
        .nest("/designs", design_routes(&state));

    Router::new()
        .route("/health", get(health_handler))
        .route("/health/ready", get(readiness_handler))
        .nest("/api", api)
        .fallback(route_not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Innermost first; requests pass CORS, then the error envelope, panic catcher and body cap
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CatchPanicLayer::new())
        .layer(ErrorHandlingLayer::new(error_config))
        .layer(cors)
}
