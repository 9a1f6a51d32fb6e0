//! Side panel coordination: which session is active, its working directory,
//! the previewed file, the chat view and the folder picker.

pub mod attach;
pub mod navigator;
pub mod picker;
pub mod session_view;
pub mod state;

pub use attach::{AttachChannel, FileAttach};
pub use navigator::{EarlierTicket, NavigationTicket, PanelNavigator, PanelSnapshot};
pub use picker::{BrowseTicket, FolderPicker};
pub use session_view::{RecoveryAction, SessionView, ViewError};
pub use state::PanelState;
