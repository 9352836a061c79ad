pub(crate) mod customers_model;
pub(crate) mod customers_traits;

pub use customers_model::{Customer, NewCustomer};
pub use customers_traits::CustomerRepositoryTrait;
