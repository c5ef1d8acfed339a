/// Story Linter — validates a story directory: every chapter and ending
/// file parses, every destination resolves, and the cast covers every speaker.
///
/// Usage: story_linter <data_dir>

use scene_engine::core::content::{ContentStore, DirContentStore};
use scene_engine::core::lint::lint_story;
use scene_engine::schema::character::Cast;
use std::io;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: story_linter <data_dir>");
        process::exit(0);
    }

    let data_dir = Path::new(&args[1]);
    if !data_dir.is_dir() {
        eprintln!("ERROR: Path '{}' is not a directory", data_dir.display());
        process::exit(1);
    }

    let store = DirContentStore::new(data_dir);
    let file_refs = match store.list_files() {
        Ok(files) => files,
        Err(e) => {
            eprintln!("ERROR: Failed to list story files: {}", e);
            process::exit(1);
        }
    };

    // A file that fails to parse is an error in its own right; keep going
    // so the rest of the story still gets checked.
    let mut load_errors = Vec::new();
    let mut files = Vec::new();
    for file in file_refs {
        match store.load(&file) {
            Ok(document) => {
                println!("  Loaded: {} ({} scenes)", file, document.len());
                files.push((file, document));
            }
            Err(e) => load_errors.push(format!("{}: {}", file, e)),
        }
    }

    let cast = match store.load_characters() {
        Ok(cast) => cast,
        Err(e) => {
            load_errors.push(format!("characters: {}", e));
            Cast::default()
        }
    };

    println!("Loaded {} story files, {} characters", files.len(), cast.len());

    let report = lint_story(&files, &cast);

    println!("\n=== Story Lint Report ===\n");

    if load_errors.is_empty() && report.is_clean() {
        println!("All checks passed!");
    }

    for warning in &report.warnings {
        println!("WARNING: {}", warning);
    }

    for error in &load_errors {
        println!("ERROR: {}", error);
    }

    for error in &report.errors {
        println!("ERROR: {}", error);
    }

    let error_count = load_errors.len() + report.errors.len();
    println!(
        "\nSummary: {} errors, {} warnings",
        error_count,
        report.warnings.len()
    );

    if error_count == 0 {
        process::exit(0);
    } else {
        process::exit(1);
    }
}
