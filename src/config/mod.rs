pub mod pool;
pub mod settings;

pub use pool::PoolSettings;
pub use settings::{AuthSettings, DatabaseSettings, ServerSettings, Settings};
