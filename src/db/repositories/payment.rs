use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::rent_payments::{self, PaymentStatus};

pub struct PaymentRepository {
    conn: DatabaseConnection,
}

impl PaymentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_property(&self, property_id: i32) -> Result<Vec<rent_payments::Model>> {
        rent_payments::Entity::find()
            .filter(rent_payments::Column::PropertyId.eq(property_id))
            .order_by_desc(rent_payments::Column::Month)
            .all(&self.conn)
            .await
            .context("Failed to list payments for property")
    }

    pub async fn list_for_tenant(&self, tenant_id: i32) -> Result<Vec<rent_payments::Model>> {
        rent_payments::Entity::find()
            .filter(rent_payments::Column::TenantId.eq(tenant_id))
            .order_by_desc(rent_payments::Column::Month)
            .all(&self.conn)
            .await
            .context("Failed to list payments for tenant")
    }

    /// Record a payment for (property, tenant, month): update amount/status
    /// in place when a row for the triple exists, insert otherwise. The
    /// unique index on the triple turns a lost race between two inserts into
    /// a constraint error instead of a duplicate row.
    ///
    /// `paid_at` tracks the status: stamped when paid, cleared when pending.
    pub async fn upsert(
        &self,
        property_id: i32,
        tenant_id: i32,
        month: NaiveDate,
        amount: Decimal,
        status: PaymentStatus,
    ) -> Result<rent_payments::Model> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction for payment upsert")?;

        let now = chrono::Utc::now().to_rfc3339();
        let paid_at = match status {
            PaymentStatus::Paid => Some(now.clone()),
            PaymentStatus::Pending => None,
        };

        let existing = rent_payments::Entity::find()
            .filter(rent_payments::Column::PropertyId.eq(property_id))
            .filter(rent_payments::Column::TenantId.eq(tenant_id))
            .filter(rent_payments::Column::Month.eq(month))
            .one(&txn)
            .await?;

        let model = if let Some(payment) = existing {
            let mut active: rent_payments::ActiveModel = payment.into();
            active.amount = Set(amount);
            active.status = Set(status);
            active.paid_at = Set(paid_at);
            active.updated_at = Set(now);
            active.update(&txn).await?
        } else {
            let active = rent_payments::ActiveModel {
                tenant_id: Set(tenant_id),
                property_id: Set(property_id),
                month: Set(month),
                amount: Set(amount),
                status: Set(status),
                paid_at: Set(paid_at),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            };
            active.insert(&txn).await?
        };

        txn.commit()
            .await
            .context("Failed to commit payment upsert")?;

        Ok(model)
    }
}
