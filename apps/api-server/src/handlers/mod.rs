//! HTTP handlers and route configuration.

mod auth;
mod health;
mod likes;
mod posts;
mod users;


use actix_web::web;

use crate::middleware::error::extractor_config;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(extractor_config)
        // Public routes
        .route("/", web::get().to(health::root))
        .route("/health", web::get().to(health::health_check))
        .route("/login", web::post().to(auth::login))
        // Signup is public, listing is not
        .service(
            web::resource("/users")
                .route(web::post().to(users::create_user))
                .route(web::get().to(users::list_users)),
        )
        // Authenticated routes
        .service(web::resource("/users/{id}").route(web::get().to(users::get_user)))
        .service(
            web::resource("/posts")
                .route(web::get().to(posts::list_posts))
                .route(web::post().to(posts::create_post)),
        )
        .service(
            web::resource("/posts/{id}")
                .route(web::get().to(posts::get_post))
                .route(web::put().to(posts::update_post))
                .route(web::delete().to(posts::delete_post)),
        )
        .service(
            web::resource("/like")
                .route(web::post().to(likes::like_post))
                .route(web::delete().to(likes::unlike_post)),
        );
}
