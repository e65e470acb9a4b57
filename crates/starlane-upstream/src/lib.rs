pub mod edsm;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod inara;
pub mod normalize;
pub mod retry;
pub mod types;

pub use edsm::EdsmClient;
pub use error::UpstreamError;
pub use extract::extract_nearest_systems;
pub use fetch::{Accept, Fetcher, HtmlPage, JsonDocument};
pub use inara::InaraClient;
pub use normalize::{normalize, RawRecords};
pub use retry::{AttemptOutcome, FetchAttempt, RetryPolicy};
pub use types::{RawJsonSystem, RawScrapedRow, SystemInformation};
