use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::borrow::Cow;
use std::collections::HashMap;

pub type PfResult<T, E = PfError> = std::result::Result<T, E>;

type FieldErrors = HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>;

#[derive(thiserror::Error, Debug)]
pub enum PfError {
    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("user does not exist")]
    CurrentUserDoesNotExist,

    #[error("email does not exist")]
    EmailDoesNotExist,

    #[error("username is taken")]
    UsernameTaken,

    #[error("email is taken")]
    EmailTaken,

    #[error("post not found")]
    PostNotFound,

    #[error("duplicate post slug: {0}")]
    DuplicatePostSlug(String),

    #[error("comment not found")]
    CommentNotFound,

    #[error("max nesting level reached")]
    MaxNestingLevel,

    #[error("diary entry not found")]
    DiaryEntryNotFound,

    #[error("message not found")]
    MessageNotFound,

    #[error("photo not found")]
    PhotoNotFound,

    #[error("error in the request body")]
    UnprocessableEntity { errors: FieldErrors },

    #[error("an error occurred with the database")]
    Sqlx(#[from] sqlx::Error),

    #[error("an internal server error occurred")]
    Anyhow(#[from] anyhow::Error),
}

impl PfError {
    /// Convenient constructor for `PfError::UnprocessableEntity`.
    ///
    /// Multiple messages for the same key are collected into a list for that key.
    pub fn unprocessable_entity<K, V>(errors: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        let mut error_map = FieldErrors::new();

        for (key, val) in errors {
            error_map
                .entry(key.into())
                .or_insert_with(Vec::new)
                .push(val.into());
        }

        Self::UnprocessableEntity { errors: error_map }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::CurrentUserDoesNotExist => StatusCode::NOT_FOUND,
            Self::EmailDoesNotExist => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UsernameTaken => StatusCode::UNPROCESSABLE_ENTITY,
            Self::EmailTaken => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PostNotFound => StatusCode::NOT_FOUND,
            Self::DuplicatePostSlug(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::CommentNotFound => StatusCode::NOT_FOUND,
            Self::MaxNestingLevel => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DiaryEntryNotFound => StatusCode::NOT_FOUND,
            Self::MessageNotFound => StatusCode::NOT_FOUND,
            Self::PhotoNotFound => StatusCode::NOT_FOUND,
            Self::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PfError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                self.status_code(),
                [(WWW_AUTHENTICATE, HeaderValue::from_static("Token"))]
                    .into_iter()
                    .collect::<HeaderMap>(),
                self.to_string(),
            )
                .into_response(),
            Self::Forbidden
            | Self::CurrentUserDoesNotExist
            | Self::PostNotFound
            | Self::CommentNotFound
            | Self::DiaryEntryNotFound
            | Self::MessageNotFound
            | Self::PhotoNotFound => (self.status_code(), ()).into_response(),
            Self::EmailDoesNotExist => {
                unprocessable_entity_with_errors([("email".into(), vec!["does not exist".into()])])
            }
            Self::UsernameTaken => unprocessable_entity_with_errors([(
                "username".into(),
                vec!["username is taken".into()],
            )]),
            Self::EmailTaken => {
                unprocessable_entity_with_errors([("email".into(), vec!["email is taken".into()])])
            }
            Self::DuplicatePostSlug(slug) => unprocessable_entity_with_errors([(
                "slug".into(),
                vec![format!("duplicate post slug: {slug}").into()],
            )]),
            Self::MaxNestingLevel => unprocessable_entity_with_errors([(
                "parentId".into(),
                vec!["max nesting level reached".into()],
            )]),
            Self::UnprocessableEntity { errors } => unprocessable_entity_with_errors(errors),
            Self::Sqlx(ref e) => {
                tracing::error!("SQLx error: {:?}", e);
                (self.status_code(), self.to_string()).into_response()
            }
            Self::Anyhow(ref e) => {
                tracing::error!("Generic error: {:?}", e);
                (self.status_code(), self.to_string()).into_response()
            }
        }
    }
}

#[derive(serde::Serialize)]
struct JsonErrors {
    errors: FieldErrors,
}

fn unprocessable_entity_with_errors(errors: impl Into<FieldErrors>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(JsonErrors {
            errors: errors.into(),
        }),
    )
        .into_response()
}
