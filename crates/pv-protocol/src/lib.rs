pub mod control;
pub mod event;
pub mod messages;

pub use control::*;
pub use event::*;
pub use messages::*;
