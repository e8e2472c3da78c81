pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod forms;
pub mod result;
pub mod sitemap;
pub mod target;

pub use crawler::{SitemapCrawler, VisitedSet};
pub use error::ScanError;
pub use fetcher::{FetchOutcome, Fetcher};
pub use forms::has_text_input_form;
pub use result::{CrawlFailure, CrawlResult, FailureKind, FormFinding};
pub use sitemap::{EntryKind, SitemapEntry};
pub use target::Target;
