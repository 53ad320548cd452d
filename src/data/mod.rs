//! Shareholder mapping persistence.

pub mod db {
    pub use crate::db::*;
}

pub mod db_storage {
    pub use crate::db_storage::*;
}

pub mod memory_store {
    pub use crate::memory_store::*;
}
