pub mod axum;
pub mod declaration;
pub mod service;
pub mod utils;
