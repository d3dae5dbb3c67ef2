mod core_config;
pub use self::core_config::*;
mod app_config;
pub use self::app_config::*;

pub const APP_NAME: &str = "hydro-service";
