// storefront/src/web/routes.rs

use actix_web::{guard, http::header, middleware::DefaultHeaders, web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::web::extractors::{ADMIN_PASSWORD_HEADER, AUTH_TOKEN_HEADER};
use crate::web::handlers::{
  admin_handlers, auth_handlers, cart_handlers, favorite_handlers, order_handlers, plant_handlers, settings_handlers,
};

const PREFLIGHT_MAX_AGE_SECS: &str = "86400";

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

async fn preflight_handler() -> HttpResponse {
  HttpResponse::Ok()
    .insert_header((header::ACCESS_CONTROL_MAX_AGE, PREFLIGHT_MAX_AGE_SECS))
    .finish()
}

async fn not_found_handler(req: HttpRequest) -> Result<HttpResponse, AppError> {
  Err(AppError::NotFound(format!("No route for {} {}", req.method(), req.path())))
}

/// Response headers that let any origin call the API from a browser.
pub fn cors_headers() -> DefaultHeaders {
  DefaultHeaders::new()
    .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
    .add((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, PUT, DELETE, OPTIONS"))
    .add((
      header::ACCESS_CONTROL_ALLOW_HEADERS,
      format!("Content-Type, {}, {}", ADMIN_PASSWORD_HEADER, AUTH_TOKEN_HEADER),
    ))
}

/// Registers the whole `/api` surface plus the body/query/path error mapping,
/// CORS preflight and the JSON 404 fallback.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::PathConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    // Preflight for any path; the resource guard lets every other method fall through.
    .service(
      web::resource("/{tail:.*}")
        .guard(guard::Options())
        .to(preflight_handler),
    )
    .service(
      web::scope("/api")
        .route("/health", web::get().to(health_check_handler))
        // Catalog
        .service(
          web::resource("/plants")
            .route(web::get().to(plant_handlers::list_plants_handler))
            .route(web::post().to(plant_handlers::create_plant_handler)),
        )
        .service(
          web::resource("/plants/{plant_id}")
            .route(web::get().to(plant_handlers::get_plant_handler))
            .route(web::put().to(plant_handlers::update_plant_handler))
            .route(web::delete().to(plant_handlers::delete_plant_handler)),
        )
        // Settings and the admin panel login
        .service(
          web::resource("/settings")
            .route(web::get().to(settings_handlers::get_settings_handler))
            .route(web::put().to(settings_handlers::update_settings_handler)),
        )
        .route("/settings/login", web::post().to(settings_handlers::admin_login_handler))
        // Accounts
        .service(
          web::scope("/auth")
            .route("/register", web::post().to(auth_handlers::register_handler))
            .route("/login", web::post().to(auth_handlers::login_handler))
            .route("/me", web::get().to(auth_handlers::me_handler))
            .route("/logout", web::post().to(auth_handlers::logout_handler)),
        )
        // Cart
        .service(
          web::resource("/cart")
            .route(web::get().to(cart_handlers::get_cart_handler))
            .route(web::post().to(cart_handlers::add_to_cart_handler))
            .route(web::delete().to(cart_handlers::clear_cart_handler)),
        )
        .service(
          web::resource("/cart/{item_id}")
            .route(web::put().to(cart_handlers::update_cart_item_handler))
            .route(web::delete().to(cart_handlers::remove_cart_item_handler)),
        )
        // Favorites
        .route("/favorites", web::get().to(favorite_handlers::list_favorites_handler))
        .route(
          "/favorites/{plant_id}",
          web::post().to(favorite_handlers::toggle_favorite_handler),
        )
        // Checkout and history
        .service(
          web::resource("/orders")
            .route(web::get().to(order_handlers::order_history_handler))
            .route(web::post().to(order_handlers::create_order_handler)),
        )
        .route("/orders/{order_id}", web::get().to(order_handlers::get_order_handler))
        // Back-office
        .service(
          web::scope("/admin")
            .route("/orders", web::get().to(admin_handlers::list_orders_handler))
            .route(
              "/orders/{order_id}/status",
              web::put().to(admin_handlers::update_order_status_handler),
            )
            .route("/users", web::get().to(admin_handlers::list_users_handler))
            .route(
              "/users/{user_id}/funds",
              web::put().to(admin_handlers::update_user_funds_handler),
            ),
        )
        .default_service(web::to(not_found_handler)),
    )
    .service(web::resource("/{tail:.*}").to(not_found_handler));
}
