pub mod config;
pub mod error;
pub mod types;

pub use config::HrDeskConfig;
pub use error::{HrDeskError, Result};
pub use types::*;
