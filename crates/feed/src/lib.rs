pub mod error;
pub mod models;
pub mod sources;
pub mod sync;
pub mod traits;

pub use error::{FeedError, Result};
pub use models::{ResultEntry, ResultsDocument};
pub use sources::{FileFeed, HttpFeed, load_format, open_feed};
pub use sync::{ResultSync, SyncReport};
pub use traits::ResultFeed;
