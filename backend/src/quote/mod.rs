pub mod client;
pub mod errors;
pub mod fetcher;
pub mod types;

pub use client::{QuoteClient, QuoteSource};
pub use errors::QuoteError;
pub use fetcher::fetch_quotes;
pub use types::*;
