mod problem_detail;
pub use self::problem_detail::*;
mod encoded_id;
pub use self::encoded_id::*;

pub mod telemetry;
