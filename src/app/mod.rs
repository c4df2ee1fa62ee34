pub mod auth;
pub mod engagement;
pub mod notifications;
pub mod posts;
