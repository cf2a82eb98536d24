pub use super::properties::Entity as Properties;
pub use super::rent_payments::Entity as RentPayments;
pub use super::users::Entity as Users;
