use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::{
    handlers::{auth, blog_post, contact, site_config, taxonomy, upload},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

// Room for the multipart envelope around the image itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_routes(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    // 1. Public routes (everyone)
    // `:post` is the slug on GET and the numeric id on the counter routes
    let public_routes = Router::new()
        .route("/api/health", get(site_config::health_handler))
        .route("/api/site-config", get(site_config::get_site_config_handler))
        .route("/api/blog-posts", get(blog_post::list_posts_handler))
        .route("/api/blog-posts/popular", get(blog_post::popular_posts_handler))
        .route("/api/blog-posts/recent", get(blog_post::recent_posts_handler))
        .route("/api/blog-posts/categories", get(taxonomy::list_categories_handler))
        .route("/api/blog-posts/tags", get(taxonomy::list_tags_handler))
        .route("/api/blog-posts/:post", get(blog_post::get_post_handler))
        .route("/api/blog-posts/:post/view", post(blog_post::increment_views_handler))
        .route("/api/blog-posts/:post/lead", post(blog_post::increment_leads_handler))
        .route("/api/blog-posts/:post/share", post(blog_post::increment_shares_handler))
        .route("/api/contact-form", post(contact::contact_form_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir));

    // 2. Editor routes (create, edit, upload) - any valid token
    let editor_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout_handler))
        .route(
            "/api/admin/blog-posts",
            get(blog_post::admin_list_posts_handler).post(blog_post::create_post_handler),
        )
        .route(
            "/api/admin/blog-posts/:id",
            get(blog_post::admin_get_post_handler).patch(blog_post::update_post_handler),
        )
        .route("/api/admin/analytics", get(blog_post::analytics_handler))
        .route(
            "/api/cms/posts",
            get(blog_post::admin_list_posts_handler).post(blog_post::cms_create_post_handler),
        )
        .route(
            "/api/cms/posts/:id",
            get(blog_post::admin_get_post_handler).patch(blog_post::update_post_handler),
        )
        .route(
            "/api/cms/images",
            get(upload::list_images_handler)
                .post(upload::upload_image_handler)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/cms/images/:id",
            get(upload::get_image_handler).patch(upload::update_image_handler),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // 3. Admin routes (delete, accounts) - admin role required
    let admin_routes = Router::new()
        .route("/api/admin/blog-posts/:id", delete(blog_post::delete_post_handler))
        .route("/api/cms/posts/:id", delete(blog_post::delete_post_handler))
        .route("/api/cms/images/:id", delete(upload::delete_image_handler))
        .route("/api/admin/users", post(auth::register_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_middleware));

    Router::new()
        .merge(public_routes)
        .merge(editor_routes)
        .merge(admin_routes)
        .with_state(state)
}
