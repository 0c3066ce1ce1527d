//! War resolution
//!
//! A war over one territory is a tug-of-war on a single score. Each tick is
//! one round: both belligerents' current defense forces are looked up, and a
//! weighted roll moves the score [`BATTLE_SCORE_DELTA`] toward one side. The
//! war concludes once the score reaches [`VICTORY_SCORE`] in either
//! direction.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{NationId, TerritoryId, Year};
use crate::nation::provider::NationDataProvider;
use crate::nation::snapshot::MAX_DEFENSE_FORCES;

/// Score movement per round
pub const BATTLE_SCORE_DELTA: i32 = 40;

/// Absolute score at which a war is decided
pub const VICTORY_SCORE: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarState {
    Ongoing,
    /// Terminal; a concluded war is never resumed
    Concluded,
}

/// Which side took ground in a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    AttackerGains,
    DefenderGains,
}

impl RoundOutcome {
    pub fn score_delta(self) -> i32 {
        match self {
            RoundOutcome::AttackerGains => BATTLE_SCORE_DELTA,
            RoundOutcome::DefenderGains => -BATTLE_SCORE_DELTA,
        }
    }
}

/// One conflict over one territory
///
/// Positive score favors the attacker, negative the defender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredWar")]
pub struct War {
    /// Unique label; also the upsert key in war stores
    pub name: String,
    pub attacker: NationId,
    pub defender: NationId,
    pub territory: TerritoryId,
    pub start_year: Year,
    score: i32,
    state: WarState,
}

/// Wire form of [`War`]; decoding goes through [`War::restored`]
#[derive(Deserialize)]
struct StoredWar {
    name: String,
    attacker: NationId,
    defender: NationId,
    territory: TerritoryId,
    #[serde(default)]
    start_year: Year,
    score: i32,
    state: WarState,
}

impl From<StoredWar> for War {
    fn from(stored: StoredWar) -> Self {
        War::new(stored.name, stored.attacker, stored.defender, stored.territory)
            .starting_in(stored.start_year)
            .restored(stored.score, stored.state == WarState::Ongoing)
    }
}

impl War {
    /// Start a new war at score 0
    ///
    /// Preconditions, not checked here: attacker and defender differ, and no
    /// other ongoing war exists for `territory` (see [`find_ongoing_war_at`];
    /// `Campaign::declare_war` enforces both).
    pub fn new(
        name: impl Into<String>,
        attacker: NationId,
        defender: NationId,
        territory: TerritoryId,
    ) -> Self {
        Self {
            name: name.into(),
            attacker,
            defender,
            territory,
            start_year: 0,
            score: 0,
            state: WarState::Ongoing,
        }
    }

    pub fn starting_in(mut self, year: Year) -> Self {
        self.start_year = year;
        self
    }

    /// Rebuild a war from stored score and status
    ///
    /// A score already at [`VICTORY_SCORE`] always restores as concluded.
    pub fn restored(mut self, score: i32, is_ongoing: bool) -> Self {
        self.score = score;
        self.state = if is_ongoing && score.abs() < VICTORY_SCORE {
            WarState::Ongoing
        } else {
            WarState::Concluded
        };
        self
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn state(&self) -> WarState {
        self.state
    }

    pub fn is_ongoing(&self) -> bool {
        self.state == WarState::Ongoing
    }

    /// The currently leading nation, if any
    pub fn advantage(&self) -> Option<&NationId> {
        match self.score {
            s if s > 0 => Some(&self.attacker),
            s if s < 0 => Some(&self.defender),
            _ => None,
        }
    }

    /// Fight one round; returns true only on the round that concludes the war
    ///
    /// Ticking a concluded war does nothing and returns false. Both nations
    /// are resolved before anything changes, so a provider error leaves the
    /// war untouched.
    pub fn tick<P, R>(&mut self, provider: &P, rng: &mut R) -> Result<bool>
    where
        P: NationDataProvider + ?Sized,
        R: Rng,
    {
        if !self.is_ongoing() {
            return Ok(false);
        }

        let defender = provider.nation(&self.defender)?;
        let attacker = provider.nation(&self.attacker)?;

        let outcome = resolve_round(attacker.defense_forces(), defender.defense_forces(), rng);
        self.score += outcome.score_delta();

        tracing::debug!(
            war = %self.name,
            ?outcome,
            score = self.score,
            "war round resolved"
        );

        if self.score.abs() >= VICTORY_SCORE {
            self.state = WarState::Concluded;
            return Ok(true);
        }

        Ok(false)
    }
}

/// Roll one round between two defense-forces ranks
///
/// Each side gets the weight `100 - defense_forces`, and the roll landing in
/// a side's weight wins that side the round. Lower defense forces therefore
/// win more rounds. When both sides are at 100 the weights are empty and the
/// round is a fair coin flip.
pub fn resolve_round<R: Rng>(
    attacker_forces: u8,
    defender_forces: u8,
    rng: &mut R,
) -> RoundOutcome {
    let max = MAX_DEFENSE_FORCES as u32;
    let defender_weight = max - (defender_forces as u32).min(max);
    let attacker_weight = max - (attacker_forces as u32).min(max);
    let total = defender_weight + attacker_weight;

    if total == 0 {
        return if rng.gen_bool(0.5) {
            RoundOutcome::AttackerGains
        } else {
            RoundOutcome::DefenderGains
        };
    }

    let roll = rng.gen_range(0..total);
    if roll < defender_weight {
        RoundOutcome::DefenderGains
    } else {
        RoundOutcome::AttackerGains
    }
}

/// First ongoing war for `territory`, skipping concluded ones
pub fn find_ongoing_war_at<'a>(wars: &'a [War], territory: &TerritoryId) -> Option<&'a War> {
    wars.iter()
        .find(|war| war.is_ongoing() && &war.territory == territory)
}
