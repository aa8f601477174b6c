pub mod config;
pub mod error;
pub mod listing;
pub mod pages;
pub mod types;

pub use config::parse_blog_toml;
pub use error::{Error, Result};
pub use listing::ListingState;
pub use pages::{PageState, PageStore};
pub use types::*;
