use crate::utils::id_encoders::{IdEncoderError, SharedIdEncoder};
use thiserror::Error as ThisError;
use url::Url;

pub const DAY_REPORT_PATH: &[&str] = &["declaration", "day"];
pub const REVISION_PATH: &[&str] = &["declaration", "revision"];

#[derive(Debug, ThisError)]
pub enum LinkError {
    #[error("Public url cannot be a base: {0}")]
    InvalidBase(Url),
    #[error(transparent)]
    IdEncoder(#[from] IdEncoderError),
}

/// Create shareable links to the declaration pages, the record ids are replaced by tokens.
#[derive(Clone)]
pub struct LinkBuilder {
    public_url: Url,
    encoder: SharedIdEncoder,
}

impl LinkBuilder {
    pub fn new(public_url: Url, encoder: SharedIdEncoder) -> Result<Self, LinkError> {
        if public_url.cannot_be_a_base() {
            return Err(LinkError::InvalidBase(public_url));
        }
        Ok(Self { public_url, encoder })
    }

    pub fn encoder(&self) -> &SharedIdEncoder {
        &self.encoder
    }

    fn link(&self, prefix: &[&str], id: u64) -> Result<Url, LinkError> {
        let token = self.encoder.obfuscate(id)?;
        let mut url = self.public_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| LinkError::InvalidBase(self.public_url.clone()))?
            .pop_if_empty()
            .extend(prefix)
            .push(&token);
        Ok(url)
    }

    pub fn day_report(&self, id: u64) -> Result<Url, LinkError> {
        self.link(DAY_REPORT_PATH, id)
    }

    pub fn revision(&self, id: u64) -> Result<Url, LinkError> {
        self.link(REVISION_PATH, id)
    }
}
