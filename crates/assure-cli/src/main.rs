//! `assure`: run the tree and placement engines over JSON files
//!
//! ## Usage
//!
//! ```bash
//! # Check the partition invariant of a case file
//! assure check case.json
//!
//! # Detach a strategy, writing the new snapshot
//! assure detach case.json strategy:3 --output case.json
//!
//! # Orphans that could hang under a property claim
//! assure orphans case.json --for property_claim
//!
//! # Place a new claim below goal 1 on a zoomed canvas
//! assure place nodes.json --type property_claim --x 640 --y 380 \
//!     --source goal:1 --direction bottom --zoom 1.5
//! ```

mod commands;

use anyhow::Context as _;
use assure_layout::{Direction, EngineConfig, PlacementEngine, PlacementRequest, Point, Viewport};
use assure_model::ElementKey;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "assure", version)]
#[command(about = "Assurance-case tree editing and node placement")]
struct Cli {
    /// Placement config (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reattach an orphan under a parent
    Attach {
        case: PathBuf,
        element: ElementKey,
        parent: ElementKey,
    },
    /// Detach an element into the orphan set
    Detach { case: PathBuf, element: ElementKey },
    /// Move an element under a new parent
    Move {
        case: PathBuf,
        element: ElementKey,
        parent: ElementKey,
    },
    /// Delete an element (cascading unless --keep-children)
    Remove {
        case: PathBuf,
        element: ElementKey,
        /// Orphan direct children instead of deleting them
        #[arg(long)]
        keep_children: bool,
    },
    /// List orphans
    Orphans {
        case: PathBuf,
        /// Only orphans attachable under this node type
        #[arg(long = "for")]
        node_type: Option<String>,
    },
    /// Verify every element sits in exactly one place
    Check { case: PathBuf },
    /// Place a new node on the canvas
    Place {
        nodes: PathBuf,
        #[arg(long = "type")]
        node_type: String,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        /// Node the new one is created from (repeatable)
        #[arg(long = "source")]
        sources: Vec<String>,
        #[arg(long, default_value_t = Direction::Auto)]
        direction: Direction,
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        pan_x: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        pan_y: f64,
    },
    /// Rank nodes near a world position
    Hints {
        nodes: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "result written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let output = cli.output.as_deref();

    match cli.command {
        Command::Attach { case, element, parent } => {
            let snapshot = commands::parse_snapshot(&read(&case)?)?;
            emit(&commands::attach(&snapshot, element, parent)?, output)?;
        }
        Command::Detach { case, element } => {
            let snapshot = commands::parse_snapshot(&read(&case)?)?;
            emit(&commands::detach(&snapshot, element)?, output)?;
        }
        Command::Move { case, element, parent } => {
            let snapshot = commands::parse_snapshot(&read(&case)?)?;
            emit(&commands::move_element(&snapshot, element, parent)?, output)?;
        }
        Command::Remove {
            case,
            element,
            keep_children,
        } => {
            let snapshot = commands::parse_snapshot(&read(&case)?)?;
            emit(&commands::remove(&snapshot, element, keep_children)?, output)?;
        }
        Command::Orphans { case, node_type } => {
            let snapshot = commands::parse_snapshot(&read(&case)?)?;
            emit(&commands::orphans(&snapshot, node_type.as_deref()), output)?;
        }
        Command::Check { case } => {
            let snapshot = commands::parse_snapshot(&read(&case)?)?;
            let report = commands::check(&snapshot);
            emit(&report, output)?;
            if !report.clean {
                tracing::warn!(violations = report.violations.len(), "partition violated");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Place {
            nodes,
            node_type,
            x,
            y,
            sources,
            direction,
            zoom,
            pan_x,
            pan_y,
        } => {
            if !(zoom.is_finite() && zoom > 0.0) {
                anyhow::bail!("zoom must be positive, got {zoom}");
            }
            let nodes = commands::parse_nodes(&read(&nodes)?)?;
            let request = PlacementRequest::new(node_type, x, y).from_sources(sources, direction);
            let view = Viewport::new(Point::new(pan_x, pan_y), zoom);
            let engine = PlacementEngine::new(config);
            emit(&commands::place(&engine, &request, &nodes, &view)?, output)?;
        }
        Command::Hints { nodes, x, y } => {
            let nodes = commands::parse_nodes(&read(&nodes)?)?;
            emit(&commands::hints(&config.layout, Point::new(x, y), &nodes), output)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assure_test_utils::sample_case;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_keys_and_repeated_sources() {
        let cli = Cli::try_parse_from([
            "assure", "place", "nodes.json", "--type", "strategy", "--x", "-40", "--y", "12.5",
            "--source", "goal:1", "--source", "goal:2", "--direction", "right",
        ])
        .unwrap();
        let Command::Place { x, sources, direction, .. } = cli.command else {
            panic!("expected place");
        };
        assert_eq!(x, -40.0);
        assert_eq!(sources, vec!["goal:1", "goal:2"]);
        assert_eq!(direction, Direction::Right);

        let cli = Cli::try_parse_from(["assure", "detach", "case.json", "strategy:3"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Detach { element, .. } if element == ElementKey::strategy(3)
        ));
        assert!(Cli::try_parse_from(["assure", "detach", "case.json", "strategy"]).is_err());
    }

    #[test]
    fn run_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let case = dir.path().join("case.json");
        let out = dir.path().join("out.json");
        std::fs::write(&case, serde_json::to_string(&sample_case()).unwrap()).unwrap();

        let cli = Cli::try_parse_from([
            "assure",
            "detach",
            case.to_str().unwrap(),
            "context:1",
            "--output",
            out.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).unwrap();

        let written = commands::parse_snapshot(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert!(written.is_orphan(&ElementKey::context(1)));
    }
}
