//! Monte Carlo drivers over the casefall engine.
//!
//! Each driver plays one game through the full [`EconomyStore`] surface with
//! a fixed naive strategy, accumulating per-trial net results into [`Stats`].
//! Everything runs under a seeded generator, so a given (seed, trials) pair
//! reproduces exactly.

use casefall_engine::games::{blackjack, coinflip, hilo, roulette, GameKind, RoundState};
use casefall_engine::{EconomyStore, EngineError};
use casefall_types::{Rarity, Role};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;

pub const BASE_BET: u64 = 100;

const PLAYER: &str = "sim_player";
const HOUSE: &str = "sim_house";

/// Running first- and second-moment accumulator for per-trial net results.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Stats {
    pub trials: u64,
    total_net: f64,
    total_net_sq: f64,
    total_wagered: f64,
}

impl Stats {
    pub fn add(&mut self, net: i64, wagered: u64) {
        let n = net as f64;
        self.trials += 1;
        self.total_net += n;
        self.total_net_sq += n * n;
        self.total_wagered += wagered as f64;
    }

    pub fn merge(&mut self, other: &Stats) {
        self.trials += other.trials;
        self.total_net += other.total_net;
        self.total_net_sq += other.total_net_sq;
        self.total_wagered += other.total_wagered;
    }

    pub fn mean_net(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.total_net / self.trials as f64
        }
    }

    pub fn mean_wagered(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.total_wagered / self.trials as f64
        }
    }

    /// Fraction of the average wager kept by the house. Positive means the
    /// player loses money in expectation.
    pub fn house_edge(&self) -> f64 {
        let mw = self.mean_wagered();
        if mw == 0.0 {
            0.0
        } else {
            -self.mean_net() / mw
        }
    }

    /// Standard error of the per-trial net mean.
    pub fn stderr(&self) -> f64 {
        if self.trials <= 1 {
            return 0.0;
        }
        let mean = self.mean_net();
        let var = (self.total_net_sq / self.trials as f64) - mean * mean;
        let var = var.max(0.0);
        (var / self.trials as f64).sqrt()
    }
}

/// One row of the house-edge report.
#[derive(Clone, Debug, Serialize)]
pub struct GameReport {
    pub game: &'static str,
    pub trials: u64,
    pub avg_wagered: f64,
    pub avg_net: f64,
    pub edge: f64,
    pub stderr: f64,
}

impl GameReport {
    fn from_stats(game: &'static str, stats: &Stats) -> Self {
        Self {
            game,
            trials: stats.trials,
            avg_wagered: stats.mean_wagered(),
            avg_net: stats.mean_net(),
            edge: stats.house_edge(),
            stderr: stats.stderr(),
        }
    }
}

/// A store with a funded player and an owner account for refills.
fn sim_store() -> Result<EconomyStore, EngineError> {
    let mut store = EconomyStore::new();
    store.register(PLAYER)?;
    store.register(HOUSE)?;
    store.bootstrap_role(HOUSE, Role::Owner)?;
    store.grant_balance(HOUSE, PLAYER, 1_000_000_000)?;
    Ok(store)
}

fn balance(store: &EconomyStore) -> u64 {
    store
        .account(PLAYER)
        .map(|a| a.balance)
        .unwrap_or_default()
}

fn top_up(store: &mut EconomyStore) -> Result<(), EngineError> {
    if balance(store) < 1_000_000 {
        store.grant_balance(HOUSE, PLAYER, 1_000_000_000)?;
    }
    Ok(())
}

/// Run `trials` rounds of one game and report the realized edge.
pub fn simulate_game(kind: GameKind, trials: u64, seed: u64) -> Result<GameReport, EngineError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut store = sim_store()?;
    let mut stats = Stats::default();

    for _ in 0..trials {
        top_up(&mut store)?;
        let before = balance(&store);
        match kind {
            GameKind::Roulette => {
                store.play_roulette(&mut rng, PLAYER, BASE_BET, roulette::Color::Red)?;
            }
            GameKind::Slots => {
                store.play_slots(&mut rng, PLAYER, BASE_BET)?;
            }
            GameKind::Coinflip => {
                store.play_coinflip(&mut rng, PLAYER, BASE_BET, coinflip::Side::Heads)?;
            }
            GameKind::Mines => run_mines(&mut store, &mut rng)?,
            GameKind::Hilo => run_hilo(&mut store, &mut rng)?,
            GameKind::Blackjack => run_blackjack(&mut store, &mut rng)?,
        }
        let after = balance(&store);
        stats.add(after as i64 - before as i64, BASE_BET);
    }
    Ok(GameReport::from_stats(kind.name(), &stats))
}

/// Strategy: three reveals on a three-mine board, then cash out.
fn run_mines(store: &mut EconomyStore, rng: &mut ChaCha8Rng) -> Result<(), EngineError> {
    let round = store.start_mines(PLAYER, BASE_BET, 3)?;
    for _ in 0..3 {
        if store.mines_reveal(rng, PLAYER, round)?.outcome.is_final() {
            return Ok(());
        }
    }
    store.mines_cashout(PLAYER, round)?;
    Ok(())
}

/// Strategy: always guess toward the wider side, cash out after two correct
/// guesses.
fn run_hilo(store: &mut EconomyStore, rng: &mut ChaCha8Rng) -> Result<(), EngineError> {
    let round = store.start_hilo(rng, PLAYER, BASE_BET)?;
    for _ in 0..2 {
        let rank = match &store.round(round)?.state {
            RoundState::Hilo(state) => state.current_rank(),
            _ => return Ok(()),
        };
        let guess = if rank > 8 { hilo::Guess::Lower } else { hilo::Guess::Higher };
        if store.hilo_guess(rng, PLAYER, round, guess)?.outcome.is_final() {
            return Ok(());
        }
    }
    store.hilo_cashout(PLAYER, round)?;
    Ok(())
}

/// Strategy: hit to 17, then stand.
fn run_blackjack(store: &mut EconomyStore, rng: &mut ChaCha8Rng) -> Result<(), EngineError> {
    let (round, settled) = store.start_blackjack(rng, PLAYER, BASE_BET)?;
    if settled.outcome.is_final() {
        return Ok(());
    }
    loop {
        let total = match store.round(round) {
            Ok(r) => match &r.state {
                RoundState::Blackjack(state) => state.player_total(),
                _ => return Ok(()),
            },
            Err(_) => return Ok(()),
        };
        let mv = if total < 17 { blackjack::Move::Hit } else { blackjack::Move::Stand };
        if store.blackjack_move(PLAYER, round, mv)?.outcome.is_final() {
            return Ok(());
        }
    }
}

/// Per-rarity pull shares over `trials` openings of one case.
#[derive(Clone, Debug, Serialize)]
pub struct DropReport {
    pub case: String,
    pub trials: u64,
    pub shares: BTreeMap<Rarity, f64>,
}

/// Open one case `trials` times and report the observed rarity distribution.
pub fn simulate_drops(case_id: &str, trials: u64, seed: u64) -> Result<DropReport, EngineError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut store = sim_store()?;
    let mut counts: BTreeMap<Rarity, u64> = BTreeMap::new();
    let mut opened = 0u64;
    for i in 0..trials {
        top_up(&mut store)?;
        prepare_open(&mut store, case_id)?;
        let drop = store.open_case(&mut rng, PLAYER, case_id, i)?;
        *counts.entry(drop.item.rarity).or_insert(0) += 1;
        opened += 1;
        // Keep the inventory from growing without bound.
        if opened % 1_000 == 0 {
            let ids: Vec<u64> = store
                .account(PLAYER)?
                .inventory
                .iter()
                .map(|item| item.id)
                .collect();
            store.sell_bulk(PLAYER, &ids)?;
        }
    }
    let shares = counts
        .into_iter()
        .map(|(rarity, count)| (rarity, count as f64 / opened as f64))
        .collect();
    Ok(DropReport {
        case: case_id.to_string(),
        trials: opened,
        shares,
    })
}

/// Satisfy a case's level and key gates before opening it.
fn prepare_open(store: &mut EconomyStore, case_id: &str) -> Result<(), EngineError> {
    let case = store.case(case_id)?.clone();
    if store.account(PLAYER)?.level < case.min_level {
        // Grinding XP through case volume would dwarf the measured run, so
        // write the level through the snapshot surface instead.
        let needed = u64::from(case.min_level) * 1_000;
        let mut snapshot = store.export_snapshot();
        if let Some(account) = snapshot
            .accounts
            .as_mut()
            .and_then(|accounts| accounts.get_mut(PLAYER))
        {
            account.xp = needed;
            account.level = 1 + (needed / 1_000) as u32;
        }
        *store = EconomyStore::import_snapshot(snapshot)?;
    }
    if let Some(key) = &case.required_key {
        if !store.account(PLAYER)?.holds_template(key) {
            store.set_forced_drop(HOUSE, PLAYER, key)?;
            let cheapest = store
                .cases_iter()
                .filter(|c| c.required_key.is_none() && c.min_level == 0)
                .min_by_key(|c| c.price)
                .map(|c| c.id.clone())
                .ok_or(EngineError::InvalidConfig("no keyless case available"))?;
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            store.open_case(&mut rng, PLAYER, &cheapest, 0)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coinflip_edge_is_zero_within_error() {
        let report = simulate_game(GameKind::Coinflip, 20_000, 11).unwrap();
        assert_eq!(report.trials, 20_000);
        // Fair 2x coinflip has no edge; allow four standard errors.
        let tolerance = 4.0 * report.stderr / BASE_BET as f64;
        assert!(report.edge.abs() < tolerance.max(0.05), "edge: {}", report.edge);
    }

    #[test]
    fn test_roulette_edge_is_positive() {
        let report = simulate_game(GameKind::Roulette, 30_000, 3).unwrap();
        // Red pays 2x on 7/15 slots: expected edge 1/15.
        assert!(report.edge > 0.0, "edge: {}", report.edge);
        assert!((report.edge - 1.0 / 15.0).abs() < 0.03, "edge: {}", report.edge);
    }

    #[test]
    fn test_mines_edge_near_configured() {
        let report = simulate_game(GameKind::Mines, 20_000, 9).unwrap();
        // Each reveal is shaved 4%; three reveals land the realized edge in
        // the low teens. Just pin the sign and a loose band.
        assert!(report.edge > 0.0 && report.edge < 0.25, "edge: {}", report.edge);
    }

    #[test]
    fn test_same_seed_reproduces() {
        let a = simulate_game(GameKind::Slots, 2_000, 42).unwrap();
        let b = simulate_game(GameKind::Slots, 2_000, 42).unwrap();
        assert_eq!(a.avg_net, b.avg_net);
        assert_eq!(a.edge, b.edge);
    }

    #[test]
    fn test_drop_shares_sum_to_one() {
        let report = simulate_drops("starter_case", 5_000, 5).unwrap();
        let total: f64 = report.shares.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        // Commons dominate the starter table.
        assert!(report.shares[&Rarity::Common] > 0.5);
    }
}
