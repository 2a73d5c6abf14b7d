pub mod jwt;
pub mod security;
pub mod text;
