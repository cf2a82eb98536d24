use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::properties;
use crate::entities::rent_payments::{self, PaymentStatus};
use crate::entities::users::UserRole;

pub mod migrator;
pub mod repositories;

pub use repositories::property::{BrowseFilter, NewProperty, PropertyUpdate};
pub use repositories::user::{NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn property_repo(&self) -> repositories::property::PropertyRepository {
        repositories::property::PropertyRepository::new(self.conn.clone())
    }

    fn payment_repo(&self) -> repositories::payment::PaymentRepository {
        repositories::payment::PaymentRepository::new(self.conn.clone())
    }

    // ---- users ----

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.user_repo().create(new_user).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        full_name: &str,
        phone: &str,
    ) -> Result<Option<User>> {
        self.user_repo().update_profile(id, full_name, phone).await
    }

    pub async fn remove_user_non_admin(&self, id: i32) -> Result<bool> {
        self.user_repo().remove_non_admin(id).await
    }

    pub async fn search_users(
        &self,
        query: Option<&str>,
        role: Option<UserRole>,
    ) -> Result<Vec<User>> {
        self.user_repo().search(query, role).await
    }

    // ---- properties ----

    pub async fn add_property(&self, new_property: NewProperty) -> Result<properties::Model> {
        self.property_repo().add(new_property).await
    }

    pub async fn get_property(&self, id: i32) -> Result<Option<properties::Model>> {
        self.property_repo().get(id).await
    }

    pub async fn get_owned_property(
        &self,
        id: i32,
        owner_id: i32,
    ) -> Result<Option<properties::Model>> {
        self.property_repo().get_owned(id, owner_id).await
    }

    pub async fn list_owner_properties(&self, owner_id: i32) -> Result<Vec<properties::Model>> {
        self.property_repo().list_by_owner(owner_id).await
    }

    pub async fn update_owned_property(
        &self,
        id: i32,
        owner_id: i32,
        update: PropertyUpdate,
    ) -> Result<Option<properties::Model>> {
        self.property_repo().update_owned(id, owner_id, update).await
    }

    pub async fn remove_owned_property(
        &self,
        id: i32,
        owner_id: i32,
    ) -> Result<Option<properties::Model>> {
        self.property_repo().remove_owned(id, owner_id).await
    }

    pub async fn remove_property(&self, id: i32) -> Result<Option<properties::Model>> {
        self.property_repo().remove(id).await
    }

    pub async fn browse_properties(&self, filter: &BrowseFilter) -> Result<Vec<properties::Model>> {
        self.property_repo().browse(filter).await
    }

    pub async fn search_properties_by_location(
        &self,
        location: Option<&str>,
    ) -> Result<Vec<properties::Model>> {
        self.property_repo().search_by_location(location).await
    }

    // ---- rent payments ----

    pub async fn list_property_payments(
        &self,
        property_id: i32,
    ) -> Result<Vec<rent_payments::Model>> {
        self.payment_repo().list_for_property(property_id).await
    }

    pub async fn list_tenant_payments(&self, tenant_id: i32) -> Result<Vec<rent_payments::Model>> {
        self.payment_repo().list_for_tenant(tenant_id).await
    }

    pub async fn upsert_payment(
        &self,
        property_id: i32,
        tenant_id: i32,
        month: NaiveDate,
        amount: Decimal,
        status: PaymentStatus,
    ) -> Result<rent_payments::Model> {
        self.payment_repo()
            .upsert(property_id, tenant_id, month, amount, status)
            .await
    }
}
