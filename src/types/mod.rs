//! Type definitions

pub mod messages;
pub mod route;
pub mod stop;
pub mod territory;

pub use messages::*;
pub use route::*;
pub use stop::*;
pub use territory::*;
