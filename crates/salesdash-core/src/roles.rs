//! Role resolution and permission checks
//!
//! Roles gate the delete action, the "show deleted" toggle, and the
//! admin user-management surface. Resolution fails closed: a missing
//! assignment or a failed lookup yields a regular user.

use crate::error::{CoreError, CoreResult};
use crate::models::{Role, UserWithRole};
use crate::store::StoreRef;

/// Resolve a user's role, defaulting to `User` on absence or error
pub async fn resolve_role(store: &StoreRef, user_id: &str) -> Role {
    match store.role(user_id).await {
        Ok(Some(role)) => role,
        Ok(None) => Role::User,
        Err(e) => {
            log::warn!("role lookup failed for {}: {}", user_id, e);
            Role::User
        }
    }
}

/// Check whether a user holds the admin role
pub async fn is_admin(store: &StoreRef, user_id: &str) -> bool {
    resolve_role(store, user_id).await == Role::Admin
}

/// Reject with `Unauthorized` unless the user is an admin
pub async fn require_admin(store: &StoreRef, user_id: &str) -> CoreResult<()> {
    if is_admin(store, user_id).await {
        Ok(())
    } else {
        Err(CoreError::Unauthorized)
    }
}

/// List every user with their resolved role (admin page)
pub async fn users_with_roles(store: &StoreRef) -> CoreResult<Vec<UserWithRole>> {
    let users = store.users().await?;
    let mut out = Vec::with_capacity(users.len());
    for user in users {
        let role = match store.role(&user.id).await? {
            Some(role) => role,
            None => Role::User,
        };
        out.push(UserWithRole {
            id: user.id,
            email: user.email,
            role,
        });
    }
    Ok(out)
}

/// Assign a role by upsert (admin page action)
pub async fn set_user_role(store: &StoreRef, user_id: &str, role: Role) -> CoreResult<()> {
    store.set_role(user_id, role).await
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserAccount;
    use crate::store::{MemoryStore, SalesStore};
    use std::sync::Arc;

    async fn store_with_users() -> StoreRef {
        let store = MemoryStore::new();
        store
            .insert_user(UserAccount {
                id: "U1".to_string(),
                email: "user@example.com".to_string(),
                name: "User One".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();
        store
            .insert_user(UserAccount {
                id: "A1".to_string(),
                email: "admin@example.com".to_string(),
                name: "Admin One".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();
        store.set_role("A1", Role::Admin).await.unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_absent_role_defaults_to_user() {
        let store = store_with_users().await;
        assert_eq!(resolve_role(&store, "U1").await, Role::User);
        assert_eq!(resolve_role(&store, "nobody").await, Role::User);
    }

    #[tokio::test]
    async fn test_admin_is_elevated() {
        let store = store_with_users().await;
        assert!(is_admin(&store, "A1").await);
        assert!(!is_admin(&store, "U1").await);
    }

    #[tokio::test]
    async fn test_require_admin() {
        let store = store_with_users().await;
        assert!(require_admin(&store, "A1").await.is_ok());
        let err = require_admin(&store, "U1").await.unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized));
    }

    #[tokio::test]
    async fn test_users_with_roles() {
        let store = store_with_users().await;
        let users = users_with_roles(&store).await.unwrap();
        assert_eq!(users.len(), 2);

        let admin = users.iter().find(|u| u.id == "A1").unwrap();
        assert_eq!(admin.role, Role::Admin);
        let user = users.iter().find(|u| u.id == "U1").unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_set_user_role_upserts() {
        let store = store_with_users().await;
        set_user_role(&store, "U1", Role::Admin).await.unwrap();
        assert!(is_admin(&store, "U1").await);

        set_user_role(&store, "U1", Role::User).await.unwrap();
        assert!(!is_admin(&store, "U1").await);
    }
}
