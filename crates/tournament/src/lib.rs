pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod validation;

pub use error::{EngineError, Result};
pub use models::*;
pub use services::PoolService;
pub use store::{MemoryStore, PredictionStore, StoreError};
