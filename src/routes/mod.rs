pub mod analyze_route;
pub mod default_route;

pub use default_route::StaticDir;
