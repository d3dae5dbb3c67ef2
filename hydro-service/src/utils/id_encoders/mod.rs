mod id_encoder;
pub use self::id_encoder::*;
mod sealed_id_encoder;
pub use self::sealed_id_encoder::*;
