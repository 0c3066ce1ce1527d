//! Territory War - Entry Point
//!
//! Loads a map and nation roster, settles the requested colonies, declares
//! the requested wars, and runs yearly ticks until every war is decided or
//! the year budget runs out. A map with no configured residents is dealt out
//! to the roster at random.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use territory_war::campaign::Campaign;
use territory_war::core::config::{GameConfig, NationEntry};
use territory_war::core::error::Result;
use territory_war::core::types::{NationId, TerritoryId};
use territory_war::nation::{
    CachedProvider, HttpNationProvider, InMemoryNations, Nation, NationDataProvider,
    NationStatesClient, RateLimiter,
};
use territory_war::territory::{InMemoryTerritories, TerritoryStore};

/// Fight territorial wars between nations
#[derive(Parser, Debug)]
#[command(name = "territory-war")]
#[command(about = "Run territorial wars over a strategic map")]
struct Args {
    /// TOML file with the map, roster, and API settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of years to simulate
    #[arg(long, default_value_t = 10)]
    years: u32,

    /// Random seed for deterministic runs (overrides the config seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Look nations up on the live API instead of the offline roster
    #[arg(long)]
    live: bool,

    /// Claim an empty territory, as <nation>@<territory> (repeatable)
    #[arg(long = "colonize", value_parser = parse_target)]
    colonies: Vec<(NationId, TerritoryId)>,

    /// Declare a war, as <nation>@<territory> (repeatable)
    #[arg(long = "attack", value_parser = parse_target)]
    attacks: Vec<(NationId, TerritoryId)>,

    /// Print the final war records as JSON
    #[arg(long)]
    json: bool,
}

fn parse_target(value: &str) -> std::result::Result<(NationId, TerritoryId), String> {
    let (nation, territory) = value
        .split_once('@')
        .ok_or_else(|| format!("expected <nation>@<territory>, got {}", value))?;

    if nation.trim().is_empty() || territory.trim().is_empty() {
        return Err(format!("expected <nation>@<territory>, got {}", value));
    }

    Ok((NationId::new(nation), TerritoryId::new(territory.trim())))
}

fn roster_nation(entry: &NationEntry) -> Nation {
    Nation::new(entry.id.as_str())
        .with_name(entry.name.clone())
        .with_demonym(entry.demonym.clone())
        .with_defense_forces(entry.defense_forces)
}

fn build_provider(config: &GameConfig, live: bool) -> Result<Box<dyn NationDataProvider>> {
    if !live {
        let roster: InMemoryNations = config.nations.iter().map(roster_nation).collect();
        tracing::info!("using offline roster of {} nations", roster.len());
        return Ok(Box::new(roster));
    }

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.requests,
        config.rate_limit.window(),
    ));
    let client = NationStatesClient::new(&config.api)?;
    let http = HttpNationProvider::new(client)?;
    tracing::info!(url = %config.api.base_url, "using live nation API");
    Ok(Box::new(CachedProvider::new(http, config.cache.ttl(), limiter)))
}

/// Territories from the config, dealt out at random when none has a resident
fn build_map(config: &GameConfig, seed: u64) -> Result<InMemoryTerritories> {
    let unsettled = config.territories.iter().all(|t| t.resident.is_none());
    if config.territories.is_empty() || !unsettled {
        return Ok(InMemoryTerritories::from_entries(&config.territories));
    }

    let territories: Vec<TerritoryId> = config
        .territories
        .iter()
        .map(|t| TerritoryId::new(t.id.clone()))
        .collect();
    let nations: Vec<NationId> = config
        .nations
        .iter()
        .map(|n| NationId::new(&n.id))
        .collect();

    tracing::info!(
        territories = territories.len(),
        nations = nations.len(),
        "dealing out a random starting map"
    );
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    InMemoryTerritories::random(&territories, &nations, &mut rng)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("territory_war=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load_from_toml(path)?,
        None => GameConfig::default(),
    };

    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    tracing::info!(seed, "starting campaign");

    let provider = build_provider(&config, args.live)?;
    let provider = provider.as_ref();

    let store = build_map(&config, seed)?;
    let mut campaign = Campaign::new(store, seed);

    for (nation, territory) in &args.colonies {
        match campaign.colonize(provider, nation, territory) {
            Ok(()) => println!("{} colonizes {}", nation, territory),
            Err(e) => println!("{} could not colonize {}: {}", nation, territory, e),
        }
    }

    for (attacker, territory) in &args.attacks {
        match campaign.declare_war(provider, attacker, territory) {
            Ok(war) => println!("Year {}: {} begins", war.start_year, war.name),
            Err(e) => println!("{} could not attack {}: {}", attacker, territory, e),
        }
    }

    for _ in 0..args.years {
        if campaign.ongoing_wars()?.is_empty() {
            break;
        }

        match campaign.advance_year(provider) {
            Ok(report) => {
                for war in &report.concluded {
                    let victor = war
                        .advantage()
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "nobody".into());
                    println!("Year {}: {} won by {}", report.year, war.name, victor);
                }
            }
            Err(e) if e.is_rate_limited() => {
                tracing::warn!("upstream quota exhausted this year: {}", e);
            }
            Err(e) => return Err(e),
        }
    }

    println!();
    println!("=== Map after year {} ===", campaign.store().year()?);
    for (territory, resident) in campaign.residents()? {
        let resident = resident
            .map(|id| id.to_string())
            .unwrap_or_else(|| "(unclaimed)".into());
        println!("  {:<12} {}", territory, resident);
    }

    let wars = campaign.store().wars()?;
    if args.json {
        match serde_json::to_string_pretty(&wars) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("could not encode wars: {}", e),
        }
    } else if !wars.is_empty() {
        println!();
        println!("=== Wars ===");
        for war in &wars {
            let status = if war.is_ongoing() { "ongoing" } else { "over" };
            println!("  {} [{}] score {}", war.name, status, war.score());
        }
    }

    Ok(())
}
