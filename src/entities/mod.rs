pub mod prelude;

pub mod properties;
pub mod rent_payments;
pub mod users;
