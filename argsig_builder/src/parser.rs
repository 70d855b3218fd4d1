mod base;
mod engine;
mod files;
mod interface;
mod middleware;

pub use base::*;
pub(crate) use engine::*;
pub use files::{FileHandle, FileMode};
pub(crate) use files::open;
pub use interface::*;
pub use middleware::*;
