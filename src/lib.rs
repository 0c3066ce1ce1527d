//! Territory War - territorial conquest over live nation data
//!
//! Wars are fought round by round using each nation's current defense
//! forces, fetched through a cached, rate-limited provider.

pub mod campaign;
pub mod core;
pub mod nation;
pub mod territory;
pub mod war;

pub use crate::campaign::{Campaign, YearReport};
pub use crate::core::error::{ConquestError, Result};
pub use crate::nation::{NationDataProvider, Nation};
pub use crate::war::War;
