use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::properties::{self, AvailabilityStatus, PropertyType};
use crate::entities::rent_payments;

/// Fields for a new listing. Availability defaults to available.
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub owner_id: i32,
    pub title: String,
    pub description: String,
    pub location: String,
    pub rent_amount: Decimal,
    pub property_type: PropertyType,
    pub main_image_path: Option<String>,
}

/// Fields an owner may edit. `new_image_path` replaces the stored path when
/// present; `None` leaves the current image untouched.
#[derive(Debug, Clone)]
pub struct PropertyUpdate {
    pub title: String,
    pub description: String,
    pub location: String,
    pub rent_amount: Decimal,
    pub property_type: PropertyType,
    pub availability_status: AvailabilityStatus,
    pub new_image_path: Option<String>,
}

/// Home-page browse filters; absent fields are not applied.
#[derive(Debug, Clone, Default)]
pub struct BrowseFilter {
    pub location: Option<String>,
    pub min_rent: Option<Decimal>,
    pub max_rent: Option<Decimal>,
    pub property_type: Option<PropertyType>,
}

pub struct PropertyRepository {
    conn: DatabaseConnection,
}

impl PropertyRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, new_property: NewProperty) -> Result<properties::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = properties::ActiveModel {
            owner_id: Set(new_property.owner_id),
            title: Set(new_property.title),
            description: Set(new_property.description),
            location: Set(new_property.location),
            rent_amount: Set(new_property.rent_amount),
            property_type: Set(new_property.property_type),
            availability_status: Set(AvailabilityStatus::Available),
            main_image_path: Set(new_property.main_image_path),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert property")
    }

    pub async fn get(&self, id: i32) -> Result<Option<properties::Model>> {
        properties::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query property by ID")
    }

    /// Fetch only if the property belongs to the given owner.
    pub async fn get_owned(&self, id: i32, owner_id: i32) -> Result<Option<properties::Model>> {
        properties::Entity::find_by_id(id)
            .filter(properties::Column::OwnerId.eq(owner_id))
            .one(&self.conn)
            .await
            .context("Failed to query owned property")
    }

    pub async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<properties::Model>> {
        properties::Entity::find()
            .filter(properties::Column::OwnerId.eq(owner_id))
            .all(&self.conn)
            .await
            .context("Failed to list owner properties")
    }

    /// Apply an owner edit. Returns `None` (without mutating) when the
    /// property does not exist or is not owned by `owner_id`.
    pub async fn update_owned(
        &self,
        id: i32,
        owner_id: i32,
        update: PropertyUpdate,
    ) -> Result<Option<properties::Model>> {
        let Some(property) = self.get_owned(id, owner_id).await? else {
            return Ok(None);
        };

        let mut active: properties::ActiveModel = property.into();
        active.title = Set(update.title);
        active.description = Set(update.description);
        active.location = Set(update.location);
        active.rent_amount = Set(update.rent_amount);
        active.property_type = Set(update.property_type);
        active.availability_status = Set(update.availability_status);
        if let Some(path) = update.new_image_path {
            active.main_image_path = Set(Some(path));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update property")?;

        Ok(Some(model))
    }

    /// Ownership-checked hard delete, cascading to rent payments.
    /// Returns the deleted row so callers can clean up the stored image.
    pub async fn remove_owned(&self, id: i32, owner_id: i32) -> Result<Option<properties::Model>> {
        let Some(property) = self.get_owned(id, owner_id).await? else {
            return Ok(None);
        };

        self.delete_with_payments(&property).await?;
        Ok(Some(property))
    }

    /// Unconditional delete by id (admin moderation path).
    pub async fn remove(&self, id: i32) -> Result<Option<properties::Model>> {
        let Some(property) = self.get(id).await? else {
            return Ok(None);
        };

        self.delete_with_payments(&property).await?;
        Ok(Some(property))
    }

    async fn delete_with_payments(&self, property: &properties::Model) -> Result<()> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction for property removal")?;

        rent_payments::Entity::delete_many()
            .filter(rent_payments::Column::PropertyId.eq(property.id))
            .exec(&txn)
            .await?;

        properties::Entity::delete_by_id(property.id)
            .exec(&txn)
            .await?;

        txn.commit()
            .await
            .context("Failed to commit property removal")?;

        Ok(())
    }

    /// Public browse with optional filters, newest first. Rent bounds are
    /// inclusive.
    pub async fn browse(&self, filter: &BrowseFilter) -> Result<Vec<properties::Model>> {
        let mut select = properties::Entity::find();

        if let Some(location) = &filter.location {
            select = select.filter(properties::Column::Location.contains(location));
        }
        if let Some(min_rent) = filter.min_rent {
            select = select.filter(properties::Column::RentAmount.gte(min_rent));
        }
        if let Some(max_rent) = filter.max_rent {
            select = select.filter(properties::Column::RentAmount.lte(max_rent));
        }
        if let Some(property_type) = filter.property_type {
            select = select.filter(properties::Column::PropertyType.eq(property_type));
        }

        select
            .order_by_desc(properties::Column::CreatedAt)
            .order_by_desc(properties::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to browse properties")
    }

    /// Admin dashboard listing: optional case-insensitive location substring.
    pub async fn search_by_location(&self, location: Option<&str>) -> Result<Vec<properties::Model>> {
        let mut select = properties::Entity::find();

        if let Some(location) = location {
            select = select.filter(properties::Column::Location.contains(location));
        }

        select
            .all(&self.conn)
            .await
            .context("Failed to search properties")
    }
}
