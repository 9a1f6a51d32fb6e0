pub mod files;
pub mod message;
pub mod session;
pub mod sync_event;

pub use files::*;
pub use message::*;
pub use session::*;
pub use sync_event::*;
