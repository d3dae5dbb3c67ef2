mod serde;
pub use self::serde::*;

pub mod id_encoders;
