pub mod auth;
pub mod blog_post;
pub mod contact;
pub mod site_config;
pub mod taxonomy;
pub mod upload;
