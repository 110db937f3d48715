use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::{error::RepositoryError, models::RoleSlug};

/// RoleLookup
///
/// Capability for fetching the role slugs assigned to a user. Implemented by the
/// Postgres repository; the access gate and role-sensitive handlers only see this
/// trait.
#[async_trait]
pub trait RoleLookup: Send + Sync {
    async fn lookup_roles(&self, user_id: Uuid) -> Result<BTreeSet<RoleSlug>, RepositoryError>;
}

pub type RoleLookupState = Arc<dyn RoleLookup>;

/// True when the user holds at least one of `wanted`.
pub async fn has_any_role(
    lookup: &dyn RoleLookup,
    user_id: Uuid,
    wanted: &[RoleSlug],
) -> Result<bool, RepositoryError> {
    let roles = lookup.lookup_roles(user_id).await?;
    Ok(wanted.iter().any(|role| roles.contains(role)))
}
