//! Caller identity extracted from trusted upstream headers.
//!
//! The identity layer in front of this service authenticates the caller
//! and forwards `x-user-id`, `x-user-email`, and `x-user-role` headers.
//! Those headers are trusted unconditionally; this service never sees a
//! credential.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use common::UserId;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Option<String>,
    pub role: Role,
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing x-user-id header".to_string()))?
            .parse::<UserId>()
            .map_err(|_| ApiError::Unauthorized("malformed x-user-id header".to_string()))?;

        let email = parts
            .headers
            .get("x-user-email")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let role = match parts
            .headers
            .get("x-user-role")
            .and_then(|value| value.to_str().ok())
        {
            Some("admin") => Role::Admin,
            _ => Role::Customer,
        };

        Ok(Identity {
            user_id,
            email,
            role,
        })
    }
}

/// An [`Identity`] that has been checked for the admin role.
#[derive(Debug, Clone)]
pub struct Admin(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        if identity.role != Role::Admin {
            return Err(ApiError::Forbidden("admin role required".to_string()));
        }
        Ok(Admin(identity))
    }
}
