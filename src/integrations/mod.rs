//! Hosted classification model integrations.

pub mod services {
    pub use crate::services::*;
}
