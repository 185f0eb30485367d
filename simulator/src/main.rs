use anyhow::Result;
use casefall_engine::games::GameKind;
use casefall_simulator::{simulate_drops, simulate_game, DropReport, GameReport};
use clap::Parser;
use tracing::info;

const ALL_GAMES: [GameKind; 6] = [
    GameKind::Mines,
    GameKind::Hilo,
    GameKind::Blackjack,
    GameKind::Roulette,
    GameKind::Slots,
    GameKind::Coinflip,
];

#[derive(Parser, Debug)]
#[command(name = "casefall-simulator", about = "House-edge and drop-rate estimates")]
struct Args {
    /// Trials per game or case.
    #[arg(long, default_value_t = 50_000)]
    trials: u64,

    /// Seed for the deterministic generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulate only this game (mines, hilo, blackjack, roulette, slots,
    /// coinflip).
    #[arg(long)]
    game: Option<String>,

    /// Also estimate per-case drop distributions.
    #[arg(long, default_value_t = false)]
    drops: bool,

    /// Emit JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_game(name: &str) -> Result<GameKind> {
    ALL_GAMES
        .into_iter()
        .find(|k| k.name() == name)
        .ok_or_else(|| anyhow::anyhow!("unknown game: {name}"))
}

fn print_game_table(reports: &[GameReport]) {
    println!(
        "{:<10} {:>9} {:>12} {:>10} {:>8} {:>8}",
        "game", "trials", "avg_wagered", "avg_net", "edge", "stderr"
    );
    for r in reports {
        println!(
            "{:<10} {:>9} {:>12.2} {:>10.4} {:>7.3}% {:>8.4}",
            r.game,
            r.trials,
            r.avg_wagered,
            r.avg_net,
            r.edge * 100.0,
            r.stderr
        );
    }
}

fn print_drop_table(reports: &[DropReport]) {
    for report in reports {
        println!("\n{} ({} opens)", report.case, report.trials);
        for (rarity, share) in &report.shares {
            println!("  {:<12} {:>7.3}%", rarity.label(), share * 100.0);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();
    let args = Args::parse();

    let games: Vec<GameKind> = match &args.game {
        Some(name) => vec![parse_game(name)?],
        None => ALL_GAMES.to_vec(),
    };

    info!(trials = args.trials, seed = args.seed, "starting simulation");
    let mut game_reports = Vec::new();
    for kind in games {
        game_reports.push(simulate_game(kind, args.trials, args.seed)?);
    }

    let mut drop_reports = Vec::new();
    if args.drops {
        let cases: Vec<String> = {
            let store = casefall_engine::EconomyStore::new();
            store.cases_iter().map(|c| c.id.clone()).collect()
        };
        for case_id in cases {
            drop_reports.push(simulate_drops(&case_id, args.trials, args.seed)?);
        }
    }

    if args.json {
        let doc = serde_json::json!({
            "games": game_reports,
            "drops": drop_reports,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print_game_table(&game_reports);
        if !drop_reports.is_empty() {
            print_drop_table(&drop_reports);
        }
    }
    Ok(())
}
