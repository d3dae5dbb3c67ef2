mod telemetry_manager;
pub use self::telemetry_manager::*;
