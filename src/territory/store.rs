//! Territory residency and war records
//!
//! The engine itself never touches storage; [`TerritoryStore`] is the narrow
//! surface the campaign layer needs from whatever persists the map.

use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::TerritoryEntry;
use crate::core::error::{ConquestError, Result};
use crate::core::types::{NationId, TerritoryId, Year};
use crate::war::engine::War;

pub trait TerritoryStore {
    /// All territory ids, in map order
    fn territories(&self) -> Vec<TerritoryId>;

    /// Current resident; `UnknownTerritory` if the territory doesn't exist
    fn resident(&self, territory: &TerritoryId) -> Result<Option<NationId>>;

    fn set_resident(&mut self, territory: &TerritoryId, nation: NationId) -> Result<()>;

    fn has_resident(&self, territory: &TerritoryId) -> Result<bool> {
        Ok(self.resident(territory)?.is_some())
    }

    /// Every war ever recorded, ongoing and concluded
    fn wars(&self) -> Result<Vec<War>>;

    /// Insert or replace wars, keyed by name
    fn put_wars(&mut self, wars: &[War]) -> Result<()>;

    fn year(&self) -> Result<Year>;

    fn increment_year(&mut self) -> Result<Year>;
}

#[derive(Debug, Clone, Default)]
struct Cell {
    resident: Option<NationId>,
}

/// Map-backed store; wars keep insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryTerritories {
    order: Vec<TerritoryId>,
    cells: AHashMap<TerritoryId, Cell>,
    wars: Vec<War>,
    year: Year,
}

impl InMemoryTerritories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty territories with no residents
    pub fn with_territories<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TerritoryId>,
    {
        let mut store = Self::new();
        for id in ids {
            store.add_territory(id.into());
        }
        store
    }

    /// Territories and starting residents from configuration
    pub fn from_entries(entries: &[TerritoryEntry]) -> Self {
        let mut store = Self::new();
        for entry in entries {
            let id = TerritoryId::new(entry.id.clone());
            store.add_territory(id.clone());
            if let Some(resident) = &entry.resident {
                if let Some(cell) = store.cells.get_mut(&id) {
                    cell.resident = Some(NationId::new(resident));
                }
            }
        }
        store
    }

    /// Deal every territory out to `nations` at random
    ///
    /// Every territory gets a resident and the split is as even as possible:
    /// each nation holds at least one territory and at most
    /// `ceil(territories / nations)`. Needs at least two nations and no more
    /// nations than territories.
    pub fn random<R>(
        territories: &[TerritoryId],
        nations: &[NationId],
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let mut store = Self::with_territories(territories.iter().cloned());

        if nations.len() < 2 {
            return Err(ConquestError::Map(format!(
                "a random map needs at least two nations, got {}",
                nations.len()
            )));
        }
        if nations.len() > store.order.len() {
            return Err(ConquestError::Map(format!(
                "{} nations can't share {} territories",
                nations.len(),
                store.order.len()
            )));
        }

        let mut shuffled = store.order.clone();
        shuffled.shuffle(rng);
        let mut deal = nations.to_vec();
        deal.shuffle(rng);

        for (territory, nation) in shuffled.iter().zip(deal.iter().cycle()) {
            store.set_resident(territory, nation.clone())?;
        }

        Ok(store)
    }

    /// Adding an existing territory is a no-op
    pub fn add_territory(&mut self, id: TerritoryId) {
        if !self.cells.contains_key(&id) {
            self.order.push(id.clone());
            self.cells.insert(id, Cell::default());
        }
    }
}

impl TerritoryStore for InMemoryTerritories {
    fn territories(&self) -> Vec<TerritoryId> {
        self.order.clone()
    }

    fn resident(&self, territory: &TerritoryId) -> Result<Option<NationId>> {
        self.cells
            .get(territory)
            .map(|cell| cell.resident.clone())
            .ok_or_else(|| ConquestError::UnknownTerritory(territory.clone()))
    }

    fn set_resident(&mut self, territory: &TerritoryId, nation: NationId) -> Result<()> {
        let cell = self
            .cells
            .get_mut(territory)
            .ok_or_else(|| ConquestError::UnknownTerritory(territory.clone()))?;
        cell.resident = Some(nation);
        Ok(())
    }

    fn wars(&self) -> Result<Vec<War>> {
        Ok(self.wars.clone())
    }

    fn put_wars(&mut self, wars: &[War]) -> Result<()> {
        for war in wars {
            match self.wars.iter_mut().find(|stored| stored.name == war.name) {
                Some(stored) => *stored = war.clone(),
                None => self.wars.push(war.clone()),
            }
        }
        Ok(())
    }

    fn year(&self) -> Result<Year> {
        Ok(self.year)
    }

    fn increment_year(&mut self) -> Result<Year> {
        self.year += 1;
        Ok(self.year)
    }
}
