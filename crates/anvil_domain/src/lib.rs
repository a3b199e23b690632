mod adapter;
mod category;
mod chunk;
mod credentials;
mod deployment;
mod error;
mod failure;
mod message;
mod model_id;
mod request;
mod retry;
mod variation;

pub use adapter::*;
pub use category::*;
pub use chunk::*;
pub use credentials::*;
pub use deployment::*;
pub use error::*;
pub use failure::*;
pub use message::*;
pub use model_id::*;
pub use request::*;
pub use retry::*;
pub use variation::*;
