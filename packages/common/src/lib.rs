pub mod api;
pub mod error;
pub mod memory;
pub mod result;
pub mod store;

pub use api::*;
pub use error::*;
pub use memory::*;
pub use result::*;
pub use store::*;
