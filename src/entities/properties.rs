use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub owner_id: i32,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Free text, substring-searchable.
    pub location: String,

    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub rent_amount: Decimal,

    pub property_type: PropertyType,

    pub availability_status: AvailabilityStatus,

    /// Public path under /static/uploads, if an image was uploaded.
    pub main_image_path: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[sea_orm(string_value = "apartment")]
    Apartment,

    #[sea_orm(string_value = "house")]
    House,
}

impl PropertyType {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "apartment" => Some(Self::Apartment),
            "house" => Some(Self::House),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::House => "house",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    #[sea_orm(string_value = "available")]
    Available,

    #[sea_orm(string_value = "rented")]
    Rented,

    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl AvailabilityStatus {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(Self::Available),
            "rented" => Some(Self::Rented),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Rented => "rented",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Owner,

    #[sea_orm(has_many = "super::rent_payments::Entity")]
    RentPayments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::rent_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RentPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
