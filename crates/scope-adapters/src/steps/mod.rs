pub mod collections;
pub mod fail;
pub mod markdown;
pub mod stamp;

pub use collections::{collections, CollectionParams};
pub use fail::fail;
pub use markdown::markdown;
pub use stamp::{stamp, StampParams};
