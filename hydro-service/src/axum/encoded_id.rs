use crate::{axum::Problem, utils::id_encoders::SharedIdEncoder};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Path},
    http::request::Parts,
};

/// Extract the id from an obfuscated path segment.
///
/// The route must have exactly one path parameter holding a token created by the `SharedIdEncoder` of
/// the state. Any failure is rejected with the same detail-less unauthorized problem, the handler is
/// not invoked for undecodable tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedId(pub u64);

#[async_trait]
impl<S> FromRequestParts<S> for EncodedId
where
    S: Send + Sync,
    SharedIdEncoder: FromRef<S>,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(token) = Path::<String>::from_request_parts(parts, state).await.map_err(|err| {
            log::debug!("Rejecting path of {}: {err}", parts.uri.path());
            Problem::unauthorized()
        })?;

        let encoder = SharedIdEncoder::from_ref(state);
        let id = encoder.deobfuscate(&token).map_err(|_| {
            log::debug!("Rejecting id token of {}", parts.uri.path());
            Problem::unauthorized()
        })?;

        Ok(EncodedId(id))
    }
}
