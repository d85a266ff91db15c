pub mod config;
pub mod data_structure;

pub use config::QuickListConfig;
pub use data_structure::quicklist::{
    Direction, Popped, QuickList, QuickListEntry, QuickListError, QuickListIter, QuickListValue,
    Where,
};
pub use data_structure::ziplist::{ZipList, ZipListError};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
