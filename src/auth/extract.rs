use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::error::{ApiError, ErrorResponse};
use crate::i18n::Translator;

/// Pulls the token out of `Authorization: Bearer <token>`. A header that is
/// present but not in that shape counts the same as no header at all.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
}

/// Request guard for protected routes: verifies the bearer token and yields
/// the owning user's id. Stateless, one verification per request.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let t = Translator::resolve(parts);
        let keys = JwtKeys::from_ref(state);

        let Some(token) = bearer_token(&parts.headers) else {
            return Err(ApiError::MissingCredential.localize(&t));
        };

        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(_) => {
                warn!("invalid or expired token");
                Err(ApiError::InvalidCredential.localize(&t))
            }
        }
    }
}
