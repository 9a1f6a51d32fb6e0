pub mod browser;

pub use browser::{FilesystemBrowser, default_root};
