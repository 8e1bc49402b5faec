pub mod aggregation;
pub mod catalog;
pub mod executor;
pub mod export;
pub mod pagination;
pub mod session;
pub mod upload;
