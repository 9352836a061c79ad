pub(crate) mod shops_model;
pub(crate) mod shops_traits;

pub use shops_model::Shop;
pub use shops_traits::ShopRepositoryTrait;
