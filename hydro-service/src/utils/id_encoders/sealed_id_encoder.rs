use super::{DecodeError, IdEncoder, IdEncoderError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as B64, Engine};
use ring::{
    aead::{self, Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN},
    hkdf, hmac,
};
use std::fmt;

pub const MIN_SECRET_LEN: usize = 16;

const ID_LEN: usize = 8;
const TAG_LEN: usize = 16;
const TOKEN_LEN: usize = NONCE_LEN + ID_LEN + TAG_LEN;

const KEY_SALT: &[u8] = b"hydro-service/id-encoder";
const CIPHER_INFO: &[u8] = b"cipher";
const NONCE_INFO: &[u8] = b"nonce";
const TOKEN_AAD: &[u8] = b"id-token.v1";

/// Encode ids as authenticated, url safe tokens.
///
/// The id is sealed with AES-256-GCM using a synthetic nonce (HMAC of the id), thus the same id and
/// secret always give the same token. The token is `base64url(nonce || cipher text || tag)`, 48
/// characters from `[A-Za-z0-9_-]`. Both keys are derived from the configured secret with HKDF, so
/// any process configured with the same secret accepts the tokens of the others.
pub struct SealedIdEncoder {
    cipher: LessSafeKey,
    nonce_key: hmac::Key,
}

impl SealedIdEncoder {
    pub fn new(secret: &str) -> Result<Self, IdEncoderError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(IdEncoderError::InvalidConfig(format!(
                "secret must be at least {MIN_SECRET_LEN} bytes long"
            )));
        }

        let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, KEY_SALT).extract(secret.as_bytes());
        let cipher_key: UnboundKey = prk
            .expand(&[CIPHER_INFO], &AES_256_GCM)
            .map_err(|_| IdEncoderError::InvalidConfig("cipher key derivation failed".into()))?
            .into();
        let nonce_key: hmac::Key = prk
            .expand(&[NONCE_INFO], hmac::HMAC_SHA256)
            .map_err(|_| IdEncoderError::InvalidConfig("nonce key derivation failed".into()))?
            .into();

        Ok(Self {
            cipher: LessSafeKey::new(cipher_key),
            nonce_key,
        })
    }

    fn nonce_for(&self, id: u64) -> [u8; NONCE_LEN] {
        let tag = hmac::sign(&self.nonce_key, &id.to_be_bytes());
        let mut nonce = [0; NONCE_LEN];
        nonce.copy_from_slice(&tag.as_ref()[..NONCE_LEN]);
        nonce
    }
}

impl fmt::Debug for SealedIdEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedIdEncoder").finish_non_exhaustive()
    }
}

impl IdEncoder for SealedIdEncoder {
    fn obfuscate(&self, id: u64) -> Result<String, IdEncoderError> {
        let nonce = self.nonce_for(id);

        let mut sealed = id.to_be_bytes().to_vec();
        self.cipher
            .seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce), Aad::from(TOKEN_AAD), &mut sealed)
            .map_err(|_| IdEncoderError::Cipher)?;

        let mut token = Vec::with_capacity(TOKEN_LEN);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&sealed);
        debug_assert_eq!(token.len(), TOKEN_LEN);

        Ok(B64.encode(token))
    }

    fn deobfuscate(&self, token: &str) -> Result<u64, DecodeError> {
        let raw = B64.decode(token).map_err(|_| DecodeError)?;
        if raw.len() != TOKEN_LEN {
            return Err(DecodeError);
        }

        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        let nonce: [u8; NONCE_LEN] = nonce.try_into().map_err(|_| DecodeError)?;

        let mut sealed = sealed.to_vec();
        let plain = self
            .cipher
            .open_in_place(Nonce::assume_unique_for_key(nonce), Aad::from(TOKEN_AAD), &mut sealed)
            .map_err(|_| DecodeError)?;
        let plain: [u8; ID_LEN] = (&*plain).try_into().map_err(|_| DecodeError)?;
        let id = u64::from_be_bytes(plain);

        // only the canonical token of an id is accepted
        if self.nonce_for(id) != nonce {
            return Err(DecodeError);
        }

        Ok(id)
    }
}

// keep the token layout in sync with the chosen algorithm
const _: () = assert!(TAG_LEN == aead::MAX_TAG_LEN);
