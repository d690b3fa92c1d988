pub mod documents;
pub mod edit;
pub mod import;
pub mod init;

pub use documents::{create, delete, list, show, CreateArgs, DeleteArgs, ShowArgs};
pub use edit::{edit, EditArgs};
pub use import::{import, ImportArgs};
pub use init::{init, InitArgs};
