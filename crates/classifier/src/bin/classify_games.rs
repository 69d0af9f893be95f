//! Classify a player's games by opening and print the opponent/opening catalog.
//!
//! Usage:
//!   cargo run --release --bin classify-games -- --pgn-dir <dir> [--user <name>]
//!   cargo run --release --bin classify-games -- --archive-dir <dir> --user <name>
//!
//! Options: --book <dir>, --snapshot <path>, --max-plies N, --opening <name>,
//! --opponent <name>, --result win|loss|draw, --color white|black, --tree N

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chess_core::{build_tree, parse_notation, GameRecord, StandardChess};
use classifier::{load_pgn_dir, load_user_games, ClassifierConfig, DirectorySource, MonthCache};
use opening_book::{classify_batch, load_index, GameCatalog, GameFilter, OpeningResolver, Outcome};
use serde_json::json;
use shakmaty::Color;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct Args {
    book: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    pgn_dir: Option<PathBuf>,
    archive_dir: Option<PathBuf>,
    user: Option<String>,
    max_plies: Option<usize>,
    filter: GameFilter,
    tree: Option<usize>,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args.get(i + 1).cloned();
        let need = || value.clone().with_context(|| format!("{flag} needs a value"));

        match flag {
            "--book" => parsed.book = Some(need()?.into()),
            "--snapshot" => parsed.snapshot = Some(need()?.into()),
            "--pgn-dir" => parsed.pgn_dir = Some(need()?.into()),
            "--archive-dir" => parsed.archive_dir = Some(need()?.into()),
            "--user" => parsed.user = Some(need()?),
            "--max-plies" => parsed.max_plies = Some(need()?.parse().context("--max-plies")?),
            "--opening" => parsed.filter.opening = Some(need()?),
            "--opponent" => parsed.filter.opponent = Some(need()?),
            "--result" => {
                parsed.filter.outcome = Some(match need()?.as_str() {
                    "win" => Outcome::Win,
                    "loss" => Outcome::Loss,
                    "draw" => Outcome::Draw,
                    other => bail!("unknown result {other:?}, expected win, loss or draw"),
                })
            }
            "--color" => {
                parsed.filter.color = Some(match need()?.as_str() {
                    "white" => Color::White,
                    "black" => Color::Black,
                    other => bail!("unknown color {other:?}, expected white or black"),
                })
            }
            "--tree" => parsed.tree = Some(need()?.parse().context("--tree")?),
            other => bail!("unknown argument {other}"),
        }
        i += 2;
    }

    Ok(parsed)
}

fn game_summary(game: &GameRecord) -> serde_json::Value {
    json!({
        "white": game.headers.white,
        "black": game.headers.black,
        "result": game.headers.result,
        "date": game.headers.date,
        "opening": game.opening_name,
        "link": game.headers.link,
    })
}

/// Move tree of one game, as nested JSON plus an indented line view.
fn game_tree(game: &GameRecord) -> anyhow::Result<serde_json::Value> {
    let tokens = parse_notation(&game.notation)?;
    let built = build_tree(&StandardChess, &tokens);
    for error in &built.errors {
        warn!("Dropped branch: {}", error);
    }

    let tree = &built.tree;
    let lines: Vec<String> = tree
        .walk()
        .filter_map(|step| {
            let label = tree.node(step.id).label()?;
            let marker = if step.is_variation { "+ " } else { "" };
            Some(format!("{}{}{}", "  ".repeat(step.depth), marker, label))
        })
        .collect();

    Ok(json!({
        "main_line": tree.main_line(),
        "lines": lines,
        "dropped": built.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "tree": tree.to_json(),
    }))
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClassifierConfig::from_env();

    let argv: Vec<String> = env::args().collect();
    let args = parse_args(&argv)?;

    let book_dir = args.book.unwrap_or(config.book_dir);
    let snapshot = args.snapshot.or(config.snapshot_path);
    let user = args.user.or(config.username);
    let max_plies = args.max_plies.unwrap_or(config.max_plies);

    let index = load_index(&book_dir, snapshot.as_deref())
        .with_context(|| format!("loading opening book from {}", book_dir.display()))?;
    let resolver = OpeningResolver::new(&index).with_max_plies(max_plies);

    let mut games = if let Some(dir) = &args.pgn_dir {
        load_pgn_dir(dir)?
    } else if let Some(dir) = args.archive_dir.or(config.archive_dir) {
        let Some(user) = user.as_deref() else {
            bail!("--archive-dir needs --user or CHESS_USERNAME");
        };
        let source = DirectorySource::new(dir);
        let mut cache = MonthCache::new();
        load_user_games(&source, &mut cache, user)?
    } else {
        bail!("no games: pass --pgn-dir or --archive-dir");
    };
    info!("Classifying {} games on their first {} plies", games.len(), resolver.max_plies());

    let report = classify_batch(&resolver, &mut games);
    let username = user.as_deref().unwrap_or_default();
    let catalog = GameCatalog::build(&games, username);

    let mut output = json!({
        "report": report,
        "catalog": catalog,
    });

    if !args.filter.is_empty() {
        let matches: Vec<serde_json::Value> = catalog
            .filter(&games, &args.filter, username)
            .into_iter()
            .map(game_summary)
            .collect();
        output["matches"] = json!(matches);
    }

    if let Some(n) = args.tree {
        let game = games
            .get(n)
            .with_context(|| format!("--tree {n}: only {} games loaded", games.len()))?;
        output["game"] = game_summary(game);
        output["game"]["moves"] = game_tree(game)?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
