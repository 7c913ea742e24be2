// Domain-layer modules and shared errors/models
pub mod analyzer {
    pub use crate::analyzer::*;
}

pub mod report {
    pub use crate::report::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
