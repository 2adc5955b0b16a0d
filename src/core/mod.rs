pub mod booth;
pub mod cancel;
pub mod config;
pub mod error;
pub mod types;

pub use booth::Booth;
