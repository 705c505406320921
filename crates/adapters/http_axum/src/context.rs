//! Request context extraction from headers.
//!
//! | Header          | Meaning                                   |
//! |-----------------|-------------------------------------------|
//! | `x-user-id`     | acting user; absent means anonymous       |
//! | `x-company-id`  | default company for new records           |
//! | `x-as-of-date`  | `YYYY-MM-DD`, defaults to today (UTC)     |

use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use techserv_domain::context::RequestContext;
use techserv_domain::error::{AuthorizationError, TechServError};
use techserv_domain::id::{CompanyId, UserId};
use techserv_domain::time::{Date, today};

use crate::error::ApiError;

pub const USER_HEADER: &str = "x-user-id";
pub const COMPANY_HEADER: &str = "x-company-id";
pub const DATE_HEADER: &str = "x-as-of-date";

/// The [`RequestContext`] of the current request.
///
/// HTTP callers are never the system caller: an absent user header leaves
/// the context anonymous, and [`Ctx::require_user`] turns it away.
#[derive(Debug, Clone, Copy)]
pub struct Ctx(pub RequestContext);

impl Ctx {
    /// The context, provided a user is identified.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::AnonymousUser`] without a user header.
    pub fn require_user(self) -> Result<RequestContext, ApiError> {
        if self.0.is_system() {
            return Err(TechServError::from(AuthorizationError::AnonymousUser).into());
        }
        Ok(self.0)
    }
}

fn header<T: FromStr>(headers: &HeaderMap, name: &str) -> Result<Option<T>, ApiError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| ApiError::invalid_id(name))?;
    T::from_str(raw.trim())
        .map(Some)
        .map_err(|_| ApiError::invalid_id(raw))
}

impl<S: Send + Sync> FromRequestParts<S> for Ctx {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user: Option<UserId> = header(&parts.headers, USER_HEADER)?;
        let company_id: Option<CompanyId> = header(&parts.headers, COMPANY_HEADER)?;
        let date: Date = header(&parts.headers, DATE_HEADER)?.unwrap_or_else(today);

        Ok(Self(RequestContext {
            user,
            company_id,
            date,
        }))
    }
}
