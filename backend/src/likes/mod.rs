pub mod aggregator;
pub mod fingerprint;
pub mod model;
pub mod recorder;
pub mod repository;
pub mod repository_sqlx;

pub use aggregator::aggregate;
pub use fingerprint::Fingerprinter;
pub use model::{InsertOutcome, LikeOutcome, LikeRecord};
pub use recorder::LikeRecorder;
pub use repository::LikeRepository;
pub use repository_sqlx::SqlxLikeRepository;
