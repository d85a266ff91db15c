pub mod quicklist;
pub mod ziplist;
