//! Campaign layer - ties wars to the strategic map
//!
//! Colonizing claims an empty territory. Declaring a war checks the
//! caller-side preconditions the engine leaves open (a resident to attack,
//! no self-attack, one ongoing war per territory). Advancing a year fights
//! one round of every ongoing war and hands each won territory to the victor.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::core::error::{ConquestError, Result};
use crate::core::types::{NationId, TerritoryId, Year};
use crate::nation::provider::NationDataProvider;
use crate::territory::store::TerritoryStore;
use crate::war::engine::{find_ongoing_war_at, War};

/// Wars that concluded during one year
#[derive(Debug, Clone, Serialize)]
pub struct YearReport {
    pub year: Year,
    pub concluded: Vec<War>,
    pub still_ongoing: usize,
}

pub struct Campaign<S> {
    store: S,
    rng: ChaCha8Rng,
}

impl<S: TerritoryStore> Campaign<S> {
    /// Deterministic campaign for a given seed
    pub fn new(store: S, seed: u64) -> Self {
        Self {
            store,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Residents of every territory, in map order
    pub fn residents(&self) -> Result<Vec<(TerritoryId, Option<NationId>)>> {
        self.store
            .territories()
            .into_iter()
            .map(|territory| {
                let resident = self.store.resident(&territory)?;
                Ok((territory, resident))
            })
            .collect()
    }

    pub fn ongoing_wars(&self) -> Result<Vec<War>> {
        Ok(self
            .store
            .wars()?
            .into_iter()
            .filter(War::is_ongoing)
            .collect())
    }

    /// Settle `nation` in an unclaimed territory
    ///
    /// An occupied territory is an error and keeps its resident.
    pub fn colonize<P>(
        &mut self,
        provider: &P,
        nation: &NationId,
        territory: &TerritoryId,
    ) -> Result<()>
    where
        P: NationDataProvider + ?Sized,
    {
        if let Some(resident) = self.store.resident(territory)? {
            return Err(ConquestError::AlreadyOccupied {
                territory: territory.clone(),
                resident,
            });
        }

        provider.nation(nation)?;
        self.store.set_resident(territory, nation.clone())?;

        tracing::info!(nation = %nation, territory = %territory, "territory colonized");
        Ok(())
    }

    /// Start a war by `attacker` against whoever lives in `territory`
    pub fn declare_war<P>(
        &mut self,
        provider: &P,
        attacker: &NationId,
        territory: &TerritoryId,
    ) -> Result<War>
    where
        P: NationDataProvider + ?Sized,
    {
        let defender = self
            .store
            .resident(territory)?
            .ok_or_else(|| ConquestError::NoResident(territory.clone()))?;

        if &defender == attacker {
            return Err(ConquestError::SelfAttack(attacker.clone()));
        }

        let wars = self.store.wars()?;
        if find_ongoing_war_at(&wars, territory).is_some() {
            return Err(ConquestError::WarAlreadyOngoing(territory.clone()));
        }

        let attacker_nation = provider.nation(attacker)?;
        provider.nation(&defender)?;

        let demonym = if attacker_nation.demonym.is_empty() {
            attacker_nation.display_name()
        } else {
            attacker_nation.demonym.as_str()
        };
        let name = unique_war_name(&wars, &format!("The {} War for {}", demonym, territory));

        let year = self.store.year()?;
        let war = War::new(name, attacker.clone(), defender, territory.clone()).starting_in(year);
        self.store.put_wars(std::slice::from_ref(&war))?;

        tracing::info!(
            war = %war.name,
            attacker = %war.attacker,
            defender = %war.defender,
            year,
            "war declared"
        );

        Ok(war)
    }

    /// Advance the calendar and fight one round of every ongoing war
    ///
    /// Wars are independent, so they are ticked in parallel, each with its
    /// own RNG seeded from the campaign RNG. If any lookup fails, the rounds
    /// that did resolve are still saved and applied, then the first error is
    /// returned.
    pub fn advance_year<P>(&mut self, provider: &P) -> Result<YearReport>
    where
        P: NationDataProvider + ?Sized,
    {
        let year = self.store.increment_year()?;

        let mut wars: Vec<War> = self
            .store
            .wars()?
            .into_iter()
            .filter(War::is_ongoing)
            .collect();
        let seeds: Vec<u64> = wars.iter().map(|_| self.rng.gen()).collect();

        let results: Vec<Result<bool>> = wars
            .par_iter_mut()
            .zip(seeds)
            .map(|(war, seed)| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                war.tick(provider, &mut rng)
            })
            .collect();

        self.store.put_wars(&wars)?;

        let mut concluded = Vec::new();
        let mut first_error = None;
        for (war, result) in wars.iter().zip(results) {
            match result {
                Ok(true) => {
                    if let Some(victor) = war.advantage() {
                        self.store.set_resident(&war.territory, victor.clone())?;
                        tracing::info!(
                            war = %war.name,
                            territory = %war.territory,
                            victor = %victor,
                            year,
                            "war concluded"
                        );
                    }
                    concluded.push(war.clone());
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(war = %war.name, error = %e, "war round skipped");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let still_ongoing = wars.iter().filter(|w| w.is_ongoing()).count();
        Ok(YearReport {
            year,
            concluded,
            still_ongoing,
        })
    }
}

/// `base`, or `base (n)` for the first free n, so names stay unique
fn unique_war_name(wars: &[War], base: &str) -> String {
    let taken = |name: &str| wars.iter().any(|w| w.name == name);
    if !taken(base) {
        return base.to_string();
    }

    (2..)
        .map(|n| format!("{} ({})", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}
