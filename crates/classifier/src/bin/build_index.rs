//! Build the opening index snapshot from the reference dataset.
//!
//! Usage: cargo run --release --bin build-index -- [--book <dir>] [--out <path>]
//!
//! Defaults come from OPENING_BOOK_DIR and OPENING_INDEX_SNAPSHOT.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use classifier::ClassifierConfig;
use opening_book::{load_dataset_dir, save_snapshot, OpeningIndex, SNAPSHOT_FILE_PATH};
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ClassifierConfig::from_env();

    let args: Vec<String> = env::args().collect();
    let mut book_dir = config.book_dir;
    let mut out = config
        .snapshot_path
        .unwrap_or_else(|| PathBuf::from(SNAPSHOT_FILE_PATH));

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--book" => {
                book_dir = args.get(i + 1).map(PathBuf::from).unwrap_or(book_dir);
                i += 2;
            }
            "--out" => {
                out = args.get(i + 1).map(PathBuf::from).unwrap_or(out);
                i += 2;
            }
            "-h" | "--help" => {
                eprintln!("Usage: {} [--book <dir>] [--out <path>]", args[0]);
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument {other}");
                i += 1;
            }
        }
    }

    let start = Instant::now();
    let records = load_dataset_dir(&book_dir)?;
    let index = OpeningIndex::build(&records);
    info!("Index built in {:.2}s", start.elapsed().as_secs_f64());

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    save_snapshot(&index, &out)?;

    let size = fs::metadata(&out)?.len();
    println!("Wrote {} ({} KB)", out.display(), size / 1024);
    println!("  Names: {}", index.name_count());
    println!("  Lines: {}", index.line_count());
    println!("  ECO codes: {}", index.eco_count());

    Ok(())
}
