use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use eyre;

#[derive(Debug)]
pub enum HttpError {
    UnknownChannel(String),
    Internal(eyre::Error),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::UnknownChannel(name) => {
                (StatusCode::NOT_FOUND, format!("No channel named {}", name)).into_response()
            }
            HttpError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Server error: {}", err),
            )
                .into_response(),
        }
    }
}

macro_rules! impl_from {
    ($from:ty) => {
        impl From<$from> for HttpError {
            fn from(err: $from) -> Self {
                Self::Internal(err.into())
            }
        }
    };
}

impl_from!(color_eyre::Report);

pub type ApiResult<T> = Result<T, HttpError>;

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::UnknownChannel(name) => write!(f, "unknown channel {}", name),
            HttpError::Internal(err) => write!(f, "{}", err),
        }
    }
}
