use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub full_name: String,

    /// Login key, stored lowercase.
    #[sea_orm(unique)]
    pub email: String,

    pub phone: String,

    /// Bcrypt password hash, never the plaintext.
    pub password_hash: String,

    pub role: UserRole,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "tenant")]
    Tenant,

    #[sea_orm(string_value = "owner")]
    Owner,

    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    /// Strict parse; callers decide whether unknown values fall back or fail.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tenant" => Some(Self::Tenant),
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Owner => "owner",
            Self::Admin => "admin",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::properties::Entity")]
    Properties,

    #[sea_orm(has_many = "super::rent_payments::Entity")]
    RentPayments,
}

impl Related<super::properties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Properties.def()
    }
}

impl Related<super::rent_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RentPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::UserRole;

    #[test]
    fn role_parse_known_values() {
        assert_eq!(UserRole::parse("tenant"), Some(UserRole::Tenant));
        assert_eq!(UserRole::parse("owner"), Some(UserRole::Owner));
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
    }

    #[test]
    fn role_parse_rejects_unknown() {
        assert_eq!(UserRole::parse("landlord"), None);
        assert_eq!(UserRole::parse("Tenant"), None);
        assert_eq!(UserRole::parse(""), None);
    }
}
