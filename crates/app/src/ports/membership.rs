//! Group membership port: answers "is this user in that group".

use std::future::Future;

use techserv_domain::error::TechServError;
use techserv_domain::id::UserId;

/// Lookup of authorization group membership.
pub trait GroupMembership {
    fn is_member(
        &self,
        user: UserId,
        group: &str,
    ) -> impl Future<Output = Result<bool, TechServError>> + Send;
}
