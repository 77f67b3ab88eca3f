pub mod asking_price;
pub mod listing;
pub mod message_format;
pub mod verdict;
pub mod video_upload;

pub use asking_price::*;
pub use listing::*;
pub use message_format::*;
pub use verdict::*;
pub use video_upload::*;
