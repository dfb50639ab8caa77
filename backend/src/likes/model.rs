/// Persisted like. `(stock_ticker, hashed_ip)` is unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LikeRecord {
    pub stock_ticker: String,
    pub hashed_ip: String,
}

impl LikeRecord {
    pub fn new(stock_ticker: impl Into<String>, hashed_ip: impl Into<String>) -> Self {
        Self {
            stock_ticker: stock_ticker.into(),
            hashed_ip: hashed_ip.into(),
        }
    }
}

/// Result of an insert attempt. A uniqueness violation is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// What happened to one ticker during like recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Recorded,
    /// Found by the existence check before inserting.
    AlreadyLiked,
    /// Passed the existence check but lost the insert to a concurrent request.
    LostRace,
}
