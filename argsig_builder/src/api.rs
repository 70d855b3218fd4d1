mod arg;
mod command;
mod core;
mod parameter;
mod shape;

pub use self::core::*;
pub use arg::*;
pub use command::*;
pub use parameter::*;
pub use shape::*;
