pub mod store;

pub use store::{InMemoryTerritories, TerritoryStore};
