pub mod classify;
pub mod client;
pub mod dedup;
pub mod featured;
pub mod filter;
