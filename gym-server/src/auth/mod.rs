//! Actor resolution
//!
//! The admin gateway in front of this service authenticates staff users and
//! forwards their identity via `x-actor-id` / `x-actor-name` headers. Every
//! mutating endpoint stamps audited records with the resolved [`Actor`];
//! requests without an identity fall back to the "System" actor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use shared::models::Actor;

/// Extractor for the acting staff user
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-actor-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());
        let name = parts
            .headers
            .get("x-actor-name")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty());

        let actor = match (id, name) {
            (Some(id), Some(name)) => Actor::new(id, name),
            (Some(id), None) => Actor {
                id: Some(id),
                name: "Unknown".to_string(),
            },
            _ => Actor::system(),
        };

        Ok(CurrentActor(actor))
    }
}
