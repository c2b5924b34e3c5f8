//! Like endpoint wire types and request helper.
//!
//! Client-side (hydrate): real HTTP call via `gloo-net`.
//! Native builds only carry the wire types; tests script responses through
//! the fake page instead.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is folded into [`LikeError`] so the controller can log it and
//! leave the displayed count untouched.

#[cfg(test)]
#[path = "like_test.rs"]
mod like_test;

use serde::Deserialize;

use crate::error::LikeError;

/// Body returned by `POST /like-post/{post_id}`. Any JSON number is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct LikeResponse {
    pub likes: f64,
}

impl LikeResponse {
    /// The count as shown on the page: `42.0` renders as `42`.
    pub fn display_count(&self) -> String {
        self.likes.to_string()
    }
}

/// Decode a like response body.
///
/// # Errors
///
/// Returns [`LikeError::Decode`] when the body is not `{"likes": <number>}`.
pub fn parse_like_response(body: &str) -> Result<LikeResponse, LikeError> {
    serde_json::from_str(body).map_err(|e| LikeError::Decode(e.to_string()))
}

/// Map an HTTP status to success or [`LikeError::Status`].
///
/// # Errors
///
/// Returns [`LikeError::Status`] for anything outside `200..=299`.
pub fn check_status(status: u16) -> Result<(), LikeError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(LikeError::Status(status))
    }
}

/// Normalize the post id read from markup. Blank ids are rejected.
///
/// # Errors
///
/// Returns [`LikeError::MissingPostId`] when the attribute is absent or blank.
pub fn post_id_from_attribute(raw: Option<String>) -> Result<String, LikeError> {
    match raw {
        Some(id) if !id.trim().is_empty() => Ok(id.trim().to_owned()),
        _ => Err(LikeError::MissingPostId),
    }
}

/// Send the like request: `POST url` with a JSON content type and no body.
///
/// # Errors
///
/// Returns [`LikeError::Network`] when the request fails to complete,
/// [`LikeError::Status`] on a non-2xx answer, and [`LikeError::Decode`] when
/// the body is not a like count.
#[cfg(feature = "hydrate")]
pub async fn send_like(url: &str) -> Result<LikeResponse, LikeError> {
    let resp = gloo_net::http::Request::post(url)
        .header("Content-Type", "application/json")
        .send()
        .await
        .map_err(|e| LikeError::Network(e.to_string()))?;
    check_status(resp.status())?;
    let body = resp.text().await.map_err(|e| LikeError::Network(e.to_string()))?;
    parse_like_response(&body)
}
