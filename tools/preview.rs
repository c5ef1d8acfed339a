/// Preview — interactive terminal player for stepping through a story.
///
/// Usage: preview --data <dir> [--config <file>]
///
/// Commands:
///   click            — the player's click: finish the reveal or move on
///   choose <n>       — pick pending choice n (1-based)
///   tick <secs>      — advance the frame clock
///   run              — tick until the current text is fully revealed
///   skip             — reveal the current text at once
///   scores           — print the score ledger
///   state            — print the current render snapshot
///   next             — jump to the next numbered chapter
///   help             — list commands
///   quit             — exit

use scene_engine::core::config::EngineConfig;
use scene_engine::core::content::DirContentStore;
use scene_engine::core::machine::{Phase, ProgressionStateMachine};
use scene_engine::core::presenter::RenderSnapshot;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Frame length used by `run`.
const RUN_STEP: f64 = 1.0 / 60.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut data_dir = None;
    let mut config_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data" if i + 1 < args.len() => {
                i += 1;
                data_dir = Some(PathBuf::from(&args[i]));
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(PathBuf::from(&args[i]));
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(data_dir) = data_dir else {
        eprintln!("Missing --data <dir>");
        print_usage();
        std::process::exit(1);
    };
    let config_path = config_path.unwrap_or_else(|| find_config(&data_dir));

    let config = match EngineConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    };

    let mut engine = match ProgressionStateMachine::new(config, DirContentStore::new(&data_dir)) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("Loaded {} characters", engine.cast().len());
    println!("Type 'help' for commands.\n");
    print_scene(&engine.snapshot());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();
        let before = (engine.file().clone(), engine.scene_id().to_string());

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "click" | "c" => {
                engine.advance();
            }
            "choose" => {
                let index = match parts.get(1).and_then(|n| n.parse::<usize>().ok()) {
                    Some(n) if n >= 1 => n - 1,
                    _ => {
                        println!("Usage: choose <n>");
                        continue;
                    }
                };
                if engine.phase() != Phase::AwaitingChoice {
                    println!("No choice is pending.");
                    continue;
                }
                if index >= engine.pending_choices().len() {
                    println!("There are only {} choices.", engine.pending_choices().len());
                    continue;
                }
                engine.select_choice(index);
            }
            "tick" => {
                let secs = match parts.get(1).and_then(|s| s.parse::<f64>().ok()) {
                    Some(s) if s > 0.0 => s,
                    _ => {
                        println!("Usage: tick <secs>");
                        continue;
                    }
                };
                engine.tick(secs);
                println!("{}", engine.snapshot().visible_text);
            }
            "run" => {
                let mut elapsed = 0.0;
                while engine.phase() == Phase::Revealing && !engine.snapshot().reveal_complete {
                    engine.tick(RUN_STEP);
                    elapsed += RUN_STEP;
                }
                println!("{}", engine.snapshot().visible_text);
                println!("(revealed in {:.2}s)", elapsed);
            }
            "skip" => {
                if engine.phase() == Phase::Revealing && !engine.snapshot().reveal_complete {
                    engine.advance();
                }
                println!("{}", engine.snapshot().visible_text);
            }
            "scores" => {
                let scores = engine.ledger().snapshot();
                if scores.is_empty() {
                    println!("No scores recorded.");
                }
                for (stat, value) in scores {
                    println!("  {}: {}", stat, value);
                }
            }
            "state" => {
                print_state(&engine.snapshot());
            }
            "next" => {
                engine.force_next_chapter();
            }
            _ => {
                println!("Unknown command: '{}'. Type 'help' for available commands.", cmd);
            }
        }

        for report in engine.take_reports() {
            println!("[{}] {}", report.level().to_uppercase(), report);
        }

        let snapshot = engine.snapshot();
        if (engine.file().clone(), engine.scene_id().to_string()) != before {
            print_scene(&snapshot);
        } else if cmd == "click" || cmd == "c" {
            print_prompt(&snapshot);
        }
        if snapshot.phase == Phase::Terminal {
            match &snapshot.ending {
                Some(name) => println!("\n*** {} ***\n", name),
                None => println!("\nThe story has stopped. Type 'quit' to exit.\n"),
            }
        }
    }
}

/// `game_config.ron` if present, else `game_config.json`.
fn find_config(data_dir: &std::path::Path) -> PathBuf {
    let ron = data_dir.join("game_config.ron");
    if ron.is_file() {
        ron
    } else {
        data_dir.join("game_config.json")
    }
}

fn print_scene(snapshot: &RenderSnapshot) {
    println!("\n--- {} / {} ---", snapshot.file, snapshot.scene_id);
    if let Some(background) = &snapshot.background {
        println!("[background: {}]", background.key);
    }
    if let Some(sprite) = &snapshot.sprite {
        println!("[sprite: {}]", sprite.key);
    }
    if !snapshot.speaker_name.is_empty() {
        println!("{}:", snapshot.speaker_name);
    }
    println!("{}", snapshot.display_text);
    print_prompt(snapshot);
}

fn print_prompt(snapshot: &RenderSnapshot) {
    if snapshot.phase != Phase::AwaitingChoice {
        return;
    }
    for (i, choice) in snapshot.pending_choices.iter().enumerate() {
        println!("  {}) {}", i + 1, choice);
    }
}

fn print_state(snapshot: &RenderSnapshot) {
    println!("phase:    {:?}", snapshot.phase);
    println!("file:     {}", snapshot.file);
    println!("scene:    {}", snapshot.scene_id);
    println!(
        "revealed: {} / {}{}",
        snapshot.revealed,
        snapshot.display_text.chars().count(),
        if snapshot.reveal_complete { " (complete)" } else { "" }
    );
    println!("visible:  {}", snapshot.visible_text);
    println!("fade:     {:.2}", snapshot.fade_level);
    println!("zoom:     {:.2}", snapshot.zoom);
    if !snapshot.pending_choices.is_empty() {
        println!("choices:  {:?}", snapshot.pending_choices);
    }
    if let Some(hover) = snapshot.hover_index {
        println!("hover:    {}", hover + 1);
    }
}

fn print_usage() {
    println!("Preview — interactive terminal player for stepping through a story.");
    println!();
    println!("Usage: preview --data <dir> [--config <file>]");
    println!();
    println!("  --data <dir>     Story directory (story/, characters/, assets/)");
    println!("  --config <file>  Engine config (default: <dir>/game_config.ron or .json)");
    println!();
    println!("Set RUST_LOG=debug to trace scene changes and branch evaluation.");
}

fn print_help() {
    println!("Commands:");
    println!("  click            Finish the reveal, or move on (also: c)");
    println!("  choose <n>       Pick pending choice n");
    println!("  tick <secs>      Advance the clock and show the visible text");
    println!("  run              Tick until the current text is fully revealed");
    println!("  skip             Reveal the current text at once");
    println!("  scores           Show the score ledger");
    println!("  state            Show the current render snapshot");
    println!("  next             Jump to the next numbered chapter");
    println!("  help             Show this help");
    println!("  quit             Exit");
}
