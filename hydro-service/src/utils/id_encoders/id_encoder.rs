use std::sync::Arc;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum IdEncoderError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Id could not be sealed")]
    Cipher,
}

/// The token could not be turned back into an id.
/// No cause is attached: malformed, tampered and foreign tokens all look the same to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[error("Invalid obfuscated id")]
pub struct DecodeError;

/// Sequence number obfuscation
pub trait IdEncoder: 'static + Send + Sync {
    fn obfuscate(&self, id: u64) -> Result<String, IdEncoderError>;
    fn deobfuscate(&self, token: &str) -> Result<u64, DecodeError>;

    /// Obfuscate an id given in its decimal string form.
    fn obfuscate_str(&self, id: &str) -> Result<String, IdEncoderError> {
        let id = id
            .parse::<u64>()
            .map_err(|err| IdEncoderError::InvalidId(format!("{err}")))?;
        self.obfuscate(id)
    }
}

pub type SharedIdEncoder = Arc<dyn IdEncoder>;
