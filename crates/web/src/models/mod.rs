//! Types the web app keeps outside the record store.

pub mod session;

pub use session::{Flash, FlashKind};
