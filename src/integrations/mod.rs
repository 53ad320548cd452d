//! External service integrations.

pub mod mirakl_client {
    pub use crate::mirakl_client::*;
}
