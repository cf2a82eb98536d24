use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::entities::users::{self, UserRole};
use crate::entities::{properties, rent_payments};

/// User data handed to handlers and templates (without the password hash).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            email: model.email,
            phone: model.phone,
            role: model.role,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Fields required to create a user row. Email must already be normalized
/// to lowercase and the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: UserRole,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            full_name: Set(new_user.full_name),
            email: Set(new_user.email),
            phone: Set(new_user.phone),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Get user by email along with the stored password hash (login path).
    pub async fn get_by_email_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }

    /// Profile updates may change full name and phone only.
    pub async fn update_profile(&self, id: i32, full_name: &str, phone: &str) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.full_name = Set(full_name.to_string());
        active.phone = Set(phone.to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update profile")?;

        Ok(Some(User::from(model)))
    }

    /// Delete a user and everything hanging off it, unless the user is an
    /// admin. Admin accounts cannot be removed through this path.
    ///
    /// Returns whether a row was deleted.
    pub async fn remove_non_admin(&self, id: i32) -> Result<bool> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction for user removal")?;

        let Some(user) = users::Entity::find_by_id(id).one(&txn).await? else {
            txn.rollback().await.ok();
            return Ok(false);
        };

        if user.role == UserRole::Admin {
            txn.rollback().await.ok();
            return Ok(false);
        }

        // Cascade by hand so removal does not depend on the sqlite
        // foreign_keys pragma: payments made as tenant, then owned
        // properties with their payments, then the user row.
        rent_payments::Entity::delete_many()
            .filter(rent_payments::Column::TenantId.eq(id))
            .exec(&txn)
            .await?;

        let owned: Vec<i32> = properties::Entity::find()
            .filter(properties::Column::OwnerId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        if !owned.is_empty() {
            rent_payments::Entity::delete_many()
                .filter(rent_payments::Column::PropertyId.is_in(owned))
                .exec(&txn)
                .await?;

            properties::Entity::delete_many()
                .filter(properties::Column::OwnerId.eq(id))
                .exec(&txn)
                .await?;
        }

        users::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit()
            .await
            .context("Failed to commit user removal")?;

        Ok(true)
    }

    /// Admin dashboard listing: optional case-insensitive substring match on
    /// name-or-email, optional exact role.
    pub async fn search(&self, query: Option<&str>, role: Option<UserRole>) -> Result<Vec<User>> {
        let mut select = users::Entity::find();

        if let Some(q) = query {
            // sqlite LIKE is case-insensitive for ASCII.
            select = select.filter(
                Condition::any()
                    .add(users::Column::FullName.contains(q))
                    .add(users::Column::Email.contains(q)),
            );
        }

        if let Some(role) = role {
            select = select.filter(users::Column::Role.eq(role));
        }

        let users = select
            .all(&self.conn)
            .await
            .context("Failed to search users")?;

        Ok(users.into_iter().map(User::from).collect())
    }
}
