use super::UserId;
use crate::error::{PfError, PfResult};
use crate::identity::Identity;
use crate::{GetConfig, System};

use axum_extra::TypedHeader;
use entrait::entrait_export as entrait;
use headers::authorization::Credentials;
use headers::Authorization;
use http::HeaderValue;
use jwt::SignWithKey;
use jwt::VerifyWithKey;
use uuid::Uuid;

const DEFAULT_SESSION_LENGTH: time::Duration = time::Duration::weeks(2);

#[derive(serde::Serialize, serde::Deserialize)]
struct SessionClaims {
    user_id: Uuid,
    email: Identity,
    /// Standard JWT `exp` claim.
    exp: i64,
}

/// The authenticated requester of a single request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    pub user_id: UserId,
    pub identity: Identity,
}

impl Session {
    pub fn identity(session: Option<&Session>) -> Option<&Identity> {
        session.map(|session| &session.identity)
    }
}

#[entrait(pub SignSession, mock_api=SignSessionMock)]
fn sign_session(deps: &(impl System + GetConfig), session: &Session) -> String {
    SessionClaims {
        user_id: session.user_id.0,
        email: session.identity.clone(),
        exp: (deps.get_current_time() + DEFAULT_SESSION_LENGTH).unix_timestamp(),
    }
    .sign_with_key(deps.get_jwt_signing_key())
    .expect("HMAC signing should be infallible")
}

#[entrait(pub Authenticate, mock_api=AuthenticateMock)]
pub mod authenticate {
    use super::*;

    pub fn authenticate(deps: &(impl System + GetConfig), token: Token) -> PfResult<Session> {
        authenticate_inner(deps, token)
    }

    pub fn opt_authenticate(
        deps: &(impl System + GetConfig),
        token: Option<Token>,
    ) -> PfResult<Option<Session>> {
        token
            .map(|token| authenticate_inner(deps, token))
            .transpose()
    }

    fn authenticate_inner(deps: &(impl System + GetConfig), token: Token) -> PfResult<Session> {
        let jwt = jwt::Token::<jwt::Header, SessionClaims, _>::parse_unverified(token.token())
            .map_err(|_| PfError::Unauthorized)?;

        let jwt = jwt
            .verify_with_key(deps.get_jwt_signing_key())
            .map_err(|_| PfError::Unauthorized)?;
        let (_header, claims) = jwt.into();

        if claims.exp < deps.get_current_time().unix_timestamp() {
            tracing::debug!(user_id = %claims.user_id, "rejected expired session token");
            return Err(PfError::Unauthorized);
        }

        Ok(Session {
            user_id: UserId(claims.user_id),
            identity: claims.email,
        })
    }
}

///
/// Data for `Token` authorization scheme.
///
#[derive(Debug)]
pub struct Token(String);

impl Token {
    const PREFIX: &'static str = "Token ";

    pub fn none() -> Option<Token> {
        None
    }

    pub fn from_token(token: &str) -> Self {
        Self(format!("{}{token}", Self::PREFIX))
    }

    pub fn token(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or_default()
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.token()
    }
}

impl Credentials for Token {
    const SCHEME: &'static str = "Token";

    fn decode(value: &HeaderValue) -> Option<Self> {
        let auth_header = value.to_str().ok()?;

        Some(Token(auth_header.to_string()))
    }

    fn encode(&self) -> HeaderValue {
        HeaderValue::from_str(&self.0).expect("token was decoded from a valid header value")
    }
}

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for Token
where
    S: Send + Sync,
{
    type Rejection = PfError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(token)) =
            TypedHeader::<Authorization<Token>>::from_request_parts(parts, state)
                .await
                .map_err(|_| PfError::Unauthorized)?;

        Ok(token)
    }
}
