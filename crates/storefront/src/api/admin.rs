//! Back-office endpoints: users, roles, permissions and groups.

use kasra_core::models::{Group, NamedInput, Permission, Role, User, UserInput};
use kasra_core::{GroupId, PermissionId, ProductId, RoleId, UserId};
use serde::Serialize;
use tracing::instrument;

use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct RoleLink {
    role_id: RoleId,
}

#[derive(Serialize)]
struct PermissionLink {
    permission_id: PermissionId,
}

#[derive(Serialize)]
struct ProductLink {
    product_id: ProductId,
}

#[derive(Serialize)]
struct UserLink {
    user_id: UserId,
}

impl ApiClient {
    // =========================================================================
    // Users
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/users").await
    }

    /// # Errors
    ///
    /// Returns an error if the user is not found or the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: UserId) -> Result<User, ApiError> {
        self.get(&format!("/users/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: &UserInput) -> Result<User, ApiError> {
        self.post("/users", input).await
    }

    /// Update the fields set in `input`; unset fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(user_id = %id))]
    pub async fn update_user(&self, id: UserId, input: &UserInput) -> Result<User, ApiError> {
        self.put(&format!("/users/{id}"), input).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.delete(&format!("/users/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user, role_id = %role))]
    pub async fn add_user_role(&self, user: UserId, role: RoleId) -> Result<(), ApiError> {
        self.post_ignored(&format!("/users/{user}/roles"), &RoleLink { role_id: role })
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user, role_id = %role))]
    pub async fn remove_user_role(&self, user: UserId, role: RoleId) -> Result<(), ApiError> {
        self.delete(&format!("/users/{user}/roles/{role}")).await
    }

    // =========================================================================
    // Roles & Permissions
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_roles(&self) -> Result<Vec<Role>, ApiError> {
        self.get("/admin/roles").await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_role(&self, input: &NamedInput) -> Result<Role, ApiError> {
        self.post("/admin/roles", input).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(role_id = %id))]
    pub async fn delete_role(&self, id: RoleId) -> Result<(), ApiError> {
        self.delete(&format!("/admin/roles/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(role_id = %role, permission_id = %permission))]
    pub async fn add_role_permission(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> Result<(), ApiError> {
        self.post_ignored(
            &format!("/admin/roles/{role}/permissions"),
            &PermissionLink {
                permission_id: permission,
            },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(role_id = %role, permission_id = %permission))]
    pub async fn remove_role_permission(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/admin/roles/{role}/permissions/{permission}"))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_permissions(&self) -> Result<Vec<Permission>, ApiError> {
        self.get("/admin/permissions").await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_permission(&self, input: &NamedInput) -> Result<Permission, ApiError> {
        self.post("/admin/permissions", input).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(permission_id = %id))]
    pub async fn delete_permission(&self, id: PermissionId) -> Result<(), ApiError> {
        self.delete(&format!("/admin/permissions/{id}")).await
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_groups(&self) -> Result<Vec<Group>, ApiError> {
        self.get("/admin/groups").await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_group(&self, input: &NamedInput) -> Result<Group, ApiError> {
        self.post("/admin/groups", input).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(group_id = %id))]
    pub async fn delete_group(&self, id: GroupId) -> Result<(), ApiError> {
        self.delete(&format!("/admin/groups/{id}")).await?;
        // Group prices may have been dropped with it.
        self.invalidate_catalog();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(group_id = %group, product_id = %product))]
    pub async fn add_group_product(&self, group: GroupId, product: ProductId) -> Result<(), ApiError> {
        self.post_ignored(
            &format!("/admin/groups/{group}/products"),
            &ProductLink {
                product_id: product,
            },
        )
        .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(group_id = %group, product_id = %product))]
    pub async fn remove_group_product(
        &self,
        group: GroupId,
        product: ProductId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/admin/groups/{group}/products/{product}"))
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(group_id = %group, user_id = %user))]
    pub async fn add_group_user(&self, group: GroupId, user: UserId) -> Result<(), ApiError> {
        self.post_ignored(
            &format!("/admin/groups/{group}/users"),
            &UserLink { user_id: user },
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(group_id = %group, user_id = %user))]
    pub async fn remove_group_user(&self, group: GroupId, user: UserId) -> Result<(), ApiError> {
        self.delete(&format!("/admin/groups/{group}/users/{user}"))
            .await
    }
}
