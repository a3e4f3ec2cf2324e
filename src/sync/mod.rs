pub mod rest_api;
pub mod store;

pub use rest_api::RestActivityStore;
pub use store::{ActivityRecord, ActivityStore, StoreError, load_schedule};
