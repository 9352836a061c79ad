pub mod constants;
pub mod customers;
pub mod errors;
pub mod pricing;
pub mod quotes;
pub mod shops;
pub mod vehicles;

pub use errors::{Error, Result};
