pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::VoxchatConfig;
pub use error::{Result, VoxchatError};
pub use events::SessionEvent;
pub use types::*;
