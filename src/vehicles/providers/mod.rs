pub(crate) mod autobolt;
pub(crate) mod nags;
pub(crate) mod nhtsa;
pub(crate) mod vehicle_data_provider;

pub use autobolt::{AutoboltClient, AutoboltConfig};
pub use nags::{GlassConfigRecord, GlassRecord, NagsClient, NagsRecords, VehicleGlassRecord};
pub use nhtsa::NhtsaClient;
pub use vehicle_data_provider::{PartsCatalog, VehicleDataProvider, VinDecodeProvider};
