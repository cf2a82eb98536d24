use crate::entities::prelude::*;
use crate::entities::{rent_payments, users};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Bootstrap admin credentials; rotate the password after first login.
const ADMIN_EMAIL: &str = "admin@rentarr.local";
const ADMIN_PASSWORD: &str = "change-me";

fn hash_admin_password() -> Result<String, DbErr> {
    bcrypt::hash(ADMIN_PASSWORD, bcrypt::DEFAULT_COST)
        .map_err(|err| DbErr::Custom(format!("Failed to hash bootstrap admin password: {err}")))
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Properties)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(RentPayments)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One payment row per (property, tenant, month); backs the upsert
        // against concurrent identical-key writes.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rent_payments_property_tenant_month")
                    .table(RentPayments)
                    .col(rent_payments::Column::PropertyId)
                    .col(rent_payments::Column::TenantId)
                    .col(rent_payments::Column::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Seed bootstrap admin so moderation is reachable on a fresh install.
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_admin_password()?;

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                users::Column::FullName,
                users::Column::Email,
                users::Column::Phone,
                users::Column::PasswordHash,
                users::Column::Role,
                users::Column::CreatedAt,
                users::Column::UpdatedAt,
            ])
            .values_panic([
                "Administrator".into(),
                ADMIN_EMAIL.into(),
                "".into(),
                password_hash.into(),
                "admin".into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RentPayments).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Properties).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
