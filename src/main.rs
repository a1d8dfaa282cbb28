mod commands;

use crate::commands::{inspect, query, replay, tally, QueryTarget};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vote_tally::{Category, RegionCollisionPolicy};

#[derive(Parser)]
#[clap(version, about = "Tally election results from registry snapshots and vote logs")]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Candidate,
    Center,
    Region,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Candidate => Category::Candidate,
            CategoryArg::Center => Category::Center,
            CategoryArg::Region => Category::Region,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CollisionArg {
    Merge,
    Probe,
}

impl From<CollisionArg> for RegionCollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Merge => RegionCollisionPolicy::Merge,
            CollisionArg::Probe => RegionCollisionPolicy::Probe,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Tally a registry snapshot and print rankings for every category.
    Tally {
        /// Registry snapshot (JSON, optionally .gz)
        snapshot: PathBuf,
        /// Write CSV, JSON and text reports into this directory
        #[clap(long)]
        export_dir: Option<PathBuf>,
        /// Only show the first N rows of each ranking
        #[clap(long)]
        top: Option<usize>,
        /// How regions whose keys collide are kept apart
        #[clap(long, value_enum, default_value = "merge")]
        region_collisions: CollisionArg,
    },
    /// Replay a vote log on top of a snapshot and verify integrity.
    Replay {
        /// Registry snapshot (JSON, optionally .gz)
        snapshot: PathBuf,
        /// Vote log, one `voter candidate center` triple per line
        vote_log: PathBuf,
        /// Ignore the vote counts carried by the snapshot
        #[clap(long)]
        from_zero: bool,
        /// Recompute percentages after every vote
        #[clap(long)]
        eager: bool,
        /// Write CSV, JSON and text reports into this directory
        #[clap(long)]
        export_dir: Option<PathBuf>,
    },
    /// Print the tree shape of one category index.
    Inspect {
        /// Registry snapshot (JSON, optionally .gz)
        snapshot: PathBuf,
        #[clap(long, value_enum)]
        category: CategoryArg,
        /// Also write the tree as a Graphviz digraph
        #[clap(long)]
        dot: Option<PathBuf>,
    },
    /// Look up records of one category index.
    Query {
        /// Registry snapshot (JSON, optionally .gz)
        snapshot: PathBuf,
        #[clap(long, value_enum)]
        category: CategoryArg,
        /// Record id
        #[clap(long, group = "target")]
        id: Option<i64>,
        /// Record name, exact match
        #[clap(long, group = "target")]
        name: Option<String>,
        /// List records with strictly more votes than this
        #[clap(long, group = "target")]
        above: Option<u64>,
        /// Show the leading record
        #[clap(long, group = "target")]
        leader: bool,
    },
}

fn main() {
    env_logger::init();
    let opts = Opts::parse();

    match opts.command {
        Command::Tally {
            snapshot,
            export_dir,
            top,
            region_collisions,
        } => {
            if let Err(e) = tally(&snapshot, export_dir.as_deref(), top, region_collisions.into()) {
                eprintln!("❌ Tally failed: {}", e);
                std::process::exit(1);
            }
        }
        Command::Replay {
            snapshot,
            vote_log,
            from_zero,
            eager,
            export_dir,
        } => match replay(&snapshot, &vote_log, from_zero, eager, export_dir.as_deref()) {
            Ok(true) => {}
            Ok(false) => std::process::exit(2),
            Err(e) => {
                eprintln!("❌ Replay failed: {}", e);
                std::process::exit(1);
            }
        },
        Command::Inspect {
            snapshot,
            category,
            dot,
        } => {
            if let Err(e) = inspect(&snapshot, category.into(), dot.as_deref()) {
                eprintln!("❌ Inspect failed: {}", e);
                std::process::exit(1);
            }
        }
        Command::Query {
            snapshot,
            category,
            id,
            name,
            above,
            leader,
        } => {
            let target = match (id, name, above, leader) {
                (Some(id), _, _, _) => QueryTarget::Id(id),
                (_, Some(name), _, _) => QueryTarget::Name(name),
                (_, _, Some(min_votes), _) => QueryTarget::Above(min_votes),
                (_, _, _, true) => QueryTarget::Leader,
                _ => {
                    eprintln!("❌ Query needs one of --id, --name, --above or --leader");
                    std::process::exit(1);
                }
            };
            if let Err(e) = query(&snapshot, category.into(), target) {
                eprintln!("❌ Query failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
