use crate::server::ServerError;
use axum::{
    Json as AxumJson,
    extract::{FromRequest, FromRequestParts, Query as AxumQuery},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::ContentType;
use serde::Serialize;
use std::{borrow::Cow, collections::BTreeMap};

#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(AxumJson), rejection(ServerError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(json) => (TypedHeader(ContentType::json()), json).into_response(),
            Err(err) => ServerError::JsonResponse(err).into_response(),
        }
    }
}

#[derive(FromRequestParts, Debug, Clone, Copy, Default)]
#[from_request(via(AxumQuery), rejection(ServerError))]
pub struct Query<T>(pub T);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
pub enum EnvelopeStatus {
    Success,
    Error,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(untagged)]
pub enum Message {
    Text(Cow<'static, str>),
    Fields(BTreeMap<&'static str, Vec<String>>),
}

impl From<&'static str> for Message {
    fn from(value: &'static str) -> Self {
        Message::Text(Cow::Borrowed(value))
    }
}

impl From<String> for Message {
    fn from(value: String) -> Self {
        Message::Text(Cow::Owned(value))
    }
}

/// The shape of every response body.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    pub message: Message,
    pub data: Option<T>,
}

impl Envelope<()> {
    pub fn error(message: impl Into<Message>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            message: message.into(),
            data: None,
        }
    }
}

/// A successful reply wrapped in an [`Envelope`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Reply<T> {
    status: StatusCode,
    message: &'static str,
    data: Option<T>,
}

impl<T> Reply<T> {
    pub fn ok(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message,
            data: Some(data),
        }
    }

    pub fn created(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            message,
            data: Some(data),
        }
    }

    pub fn accepted(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::ACCEPTED,
            message,
            data: Some(data),
        }
    }
}

impl Reply<()> {
    pub fn message(message: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            message,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let envelope = Envelope {
            status: EnvelopeStatus::Success,
            message: self.message.into(),
            data: self.data,
        };

        (self.status, Json(envelope)).into_response()
    }
}

/// 204 with an empty body.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}
