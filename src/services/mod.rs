pub mod conversation;
pub mod droid;
pub mod gemini_agent;
pub mod listing_locator;
pub mod marketplace_scraper;
pub mod narrator;
pub mod tool;

pub use conversation::*;
pub use droid::*;
pub use gemini_agent::*;
pub use listing_locator::*;
pub use marketplace_scraper::*;
pub use narrator::*;
pub use tool::*;
