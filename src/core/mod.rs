// Domain-layer modules and shared errors/models
pub mod ubo {
    pub use crate::ubo::*;
}

pub mod ubo_keys {
    pub use crate::ubo_keys::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
