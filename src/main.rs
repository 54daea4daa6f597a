//! Dichokey - dichotomous keys from OCR text.
//!
//! Builds navigable keys from OCR'd flora text and walks them interactively.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

use dichokey::core::{Config, CONFIG_ENV};
use dichokey::key::{self, BuildOutput, KeyStore};
use dichokey::{tui, App, NavState, Navigator};

/// Turn OCR'd dichotomous keys into navigable decision trees
#[derive(Parser)]
#[command(name = "dichokey")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file to use
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a key from OCR text
    Build {
        /// Genus name (reads <ocr_dir>/<genus>_ocr.txt)
        genus: Option<String>,

        /// OCR text file to read instead of the genus default
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Key file to write instead of the genus default
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Refuse to write a key with conflicts or dangling references
        #[arg(long)]
        strict: bool,

        /// Build and report without writing anything
        #[arg(short, long)]
        dry_run: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Build a key for every OCR file in the OCR directory
    BuildAll {
        /// Directory to scan for *_ocr.txt files
        #[arg(long)]
        ocr_dir: Option<PathBuf>,

        /// Refuse to write keys with conflicts or dangling references
        #[arg(long)]
        strict: bool,
    },

    /// Show the steps recognized in an OCR text file
    Parse {
        /// OCR text file
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print a key as an indented outline
    Tree {
        /// Key file or genus name
        key: String,
    },

    /// Check a key for structural problems
    Check {
        /// Key file or genus name
        key: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Walk a key interactively
    Walk {
        /// Key file or genus name
        key: String,

        /// Walk non-interactively: comma-separated option numbers, `b` for back
        #[arg(short, long)]
        choices: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// Show configuration
    Config {
        /// Show config directory path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Build { genus, input, output, strict, dry_run, format } => {
            cmd_build(&config, genus.as_deref(), input, output, strict, dry_run, &format)?;
        }
        Commands::BuildAll { ocr_dir, strict } => {
            cmd_build_all(&config, ocr_dir, strict)?;
        }
        Commands::Parse { file, format } => {
            cmd_parse(&file, &format)?;
        }
        Commands::Tree { key } => {
            cmd_tree(&config, &key)?;
        }
        Commands::Check { key, format } => {
            cmd_check(&config, &key, &format)?;
        }
        Commands::Walk { key, choices } => {
            cmd_walk(&config, &key, choices.as_deref())?;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
        }
        Commands::Config { path } => {
            cmd_config(&config, path)?;
        }
    }

    Ok(())
}

/// Genus name from `viola_ocr.txt` or `viola_key.json`.
fn genus_from_path(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("key");
    stem.trim_end_matches("_ocr").trim_end_matches("_key").to_string()
}

fn cmd_build(
    config: &Config,
    genus: Option<&str>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
    dry_run: bool,
    format: &str,
) -> Result<()> {
    let input = match (input, genus) {
        (Some(path), _) => path,
        (None, Some(genus)) => config.paths.ocr_file(genus),
        (None, None) => bail!("Provide a genus name or --input <FILE>"),
    };
    let output = output.unwrap_or_else(|| {
        config.paths.key_file(genus.map_or_else(|| genus_from_path(&input), str::to_string).as_str())
    });
    let strict = strict || config.build.strict;

    let out = if dry_run {
        key::build_file(&input)?
    } else {
        key::build_and_save(&input, &output, strict)
            .with_context(|| format!("Failed to build key from {}", input.display()))?
    };

    match format {
        "json" => {
            let summary = serde_json::json!({
                "input": input,
                "output": (!dry_run).then_some(&output),
                "nodes": out.store.len(),
                "roots": out.store.roots().count(),
                "report": out.report,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {
            print_report(&out);
            if dry_run {
                println!("Dry run, nothing written");
            } else {
                println!("Key saved: {}", output.display());
            }
        }
    }

    Ok(())
}

fn print_report(out: &BuildOutput) {
    println!(
        "{} nodes, {} roots, max depth {}",
        out.store.len(),
        out.store.roots().count(),
        out.store.max_level()
    );
    for c in &out.report.conflicts {
        println!("  conflict: step {} repeated (\"{}\"), kept \"{}\"", c.id, c.discarded, c.kept);
    }
    for d in &out.report.dangling {
        println!("  dangling: step {} leads to missing step {}", d.from, d.target);
    }
}

fn cmd_build_all(config: &Config, ocr_dir: Option<PathBuf>, strict: bool) -> Result<()> {
    let dir = ocr_dir.unwrap_or_else(|| config.paths.ocr_dir());
    if !dir.is_dir() {
        bail!("OCR directory not found: {}", dir.display());
    }
    let strict = strict || config.build.strict;

    let mut inputs: Vec<PathBuf> = WalkDir::new(&dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with("_ocr.txt")))
        .collect();
    inputs.sort();

    let mut failed = 0;
    for input in &inputs {
        let genus = genus_from_path(input);
        let output = config.paths.key_file(&genus);
        match key::build_and_save(input, &output, strict) {
            Ok(out) => println!(
                "✓ {genus}: {} nodes, {} conflicts, {} dangling -> {}",
                out.store.len(),
                out.report.conflicts.len(),
                out.report.dangling.len(),
                output.display()
            ),
            Err(e) => {
                failed += 1;
                tracing::warn!(genus = %genus, error = %e, "Build failed");
                println!("✗ {genus}: {e}");
            }
        }
    }

    println!("\nBuilt {} of {} keys", inputs.len() - failed, inputs.len());
    if failed > 0 {
        bail!("{failed} key(s) failed to build");
    }
    Ok(())
}

fn cmd_parse(file: &Path, format: &str) -> Result<()> {
    let records = key::parse_file(file)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&records)?),
        _ => {
            for r in &records {
                println!("{:<6} {:<6} {}", r.id.as_str(), r.goto.to_string(), r.text);
            }
            println!("\nTotal: {} steps", records.len());
        }
    }

    Ok(())
}

fn load_key(config: &Config, arg: &str) -> Result<(KeyStore, String)> {
    let path = config.paths.resolve_key(arg);
    let store =
        KeyStore::load(&path).with_context(|| format!("Failed to load key {}", path.display()))?;
    Ok((store, genus_from_path(&path)))
}

fn cmd_tree(config: &Config, arg: &str) -> Result<()> {
    let (store, _) = load_key(config, arg)?;
    print!("{}", key::outline(&store));
    Ok(())
}

fn cmd_check(config: &Config, arg: &str, format: &str) -> Result<()> {
    let (store, name) = load_key(config, arg)?;
    let issues = store.check();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&issues)?),
        _ => {
            for issue in &issues {
                println!("  {issue}");
            }
            if issues.is_empty() {
                println!("{name}: {} nodes, no problems found", store.len());
            }
        }
    }

    if !issues.is_empty() {
        bail!("{} problem(s) found in {name}", issues.len());
    }
    Ok(())
}

fn cmd_walk(config: &Config, arg: &str, choices: Option<&str>) -> Result<()> {
    let (store, name) = load_key(config, arg)?;

    let Some(choices) = choices else {
        let app = tui::run_tui(App::new(store, name, &config.ui))?;
        if let Some(result) = app.navigator.result() {
            println!("{result}");
        }
        return Ok(());
    };

    let mut nav = Navigator::new(store);
    for choice in choices.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if choice.eq_ignore_ascii_case("b") || choice.eq_ignore_ascii_case("back") {
            nav.back();
            continue;
        }
        let number: usize =
            choice.parse().with_context(|| format!("Invalid choice '{choice}'"))?;
        let Some(index) = number.checked_sub(1) else {
            bail!("Invalid choice '{choice}': options are numbered from 1");
        };
        nav.select(index).with_context(|| format!("Choice {number}"))?;
    }

    print_state(&nav);
    match nav.state() {
        NavState::MissingStep { target, .. } => bail!("Walk ended on missing step {target}"),
        NavState::GotoCycle { id } => bail!("Walk ended in a goto cycle at step {id}"),
        NavState::Empty => bail!("Key {name} is empty"),
        _ => Ok(()),
    }
}

fn print_state(nav: &Navigator) {
    match nav.state() {
        NavState::Browsing { id } => {
            let text = nav.current().map_or("", |n| n.text.as_str());
            println!("Step {id}: {text}");
            for (i, option) in nav.options().iter().enumerate() {
                println!("  {}. [{}] {}", i + 1, option.id, option.text);
            }
        }
        NavState::Terminal { id } => {
            println!("Result: {} (step {id})", nav.result().unwrap_or_default());
        }
        NavState::MissingStep { from, target } => {
            println!("Missing step: {from} leads to {target}, which is not in this key");
        }
        NavState::GotoCycle { id } => println!("Goto cycle at step {id}"),
        NavState::Empty => println!("Empty key"),
    }
}

fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "dichokey", &mut io::stdout());
}

fn cmd_config(config: &Config, show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_dir() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
