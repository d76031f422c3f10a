//! Store-backed access operations. The resolution rules live in
//! `resolver`; this module only fetches and writes.
use chrono::Utc;

use crate::access::resolver::{resolve_effective_access, EffectiveAccess};
use crate::error::{AppError, AppResult};
use crate::model::menu::MenuKey;
use crate::model::menu_access::{MenuAccessOverride, OverrideSummary};
use crate::model::role::Role;
use crate::store::MenuAccessStore;

pub async fn effective_access(
    store: &dyn MenuAccessStore,
    user_id: u64,
    role: Role,
) -> AppResult<EffectiveAccess> {
    let access_override = store.fetch_override(user_id).await?;
    Ok(resolve_effective_access(role, access_override.as_ref()))
}

/// Replaces the user's override with exactly `keys`. An empty list is a
/// valid override.
pub async fn set_user_access<S: AsRef<str>>(
    store: &dyn MenuAccessStore,
    user_id: u64,
    keys: &[S],
) -> AppResult<MenuAccessOverride> {
    let menu_keys = MenuKey::parse_all(keys)?;

    if store.find_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("user not found".to_string()));
    }

    let access = MenuAccessOverride {
        user_id,
        menu_keys,
        updated_at: Utc::now(),
    };
    store.save_override(&access).await?;

    tracing::info!(user_id, keys = access.menu_keys.len(), "Menu access override saved");
    Ok(access)
}

/// Drops the override so the user falls back to role defaults. Resetting a
/// user without an override is not an error.
pub async fn reset_user_access(store: &dyn MenuAccessStore, user_id: u64) -> AppResult<()> {
    if store.find_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("user not found".to_string()));
    }

    let removed = store.delete_override(user_id).await?;
    tracing::info!(user_id, removed, "Menu access reset to role defaults");
    Ok(())
}

pub async fn list_overrides(store: &dyn MenuAccessStore) -> AppResult<Vec<OverrideSummary>> {
    store.list_overrides().await
}
