use super::load_snapshot;
use colored::*;
use instant::Instant;
use std::path::Path;
use vote_tally::formats;
use vote_tally::reports::{self, display, export};
use vote_tally::{PercentageRefresh, TallyOptions, TallySession};

/// Replay a vote log against a snapshot. Returns whether the integrity
/// check passed afterwards.
pub fn replay(
    snapshot_path: &Path,
    vote_log_path: &Path,
    from_zero: bool,
    eager: bool,
    export_dir: Option<&Path>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let loaded = load_snapshot(snapshot_path)?;
    let registry = if from_zero {
        loaded.snapshot.zeroed()
    } else {
        loaded.snapshot.clone()
    };

    let votes = formats::read_vote_log(vote_log_path)?;
    println!(
        "🗳️  Replaying {} votes from {}",
        votes.len().to_string().bright_yellow(),
        vote_log_path.display().to_string().bright_cyan()
    );

    let options = TallyOptions {
        percentages: if eager {
            PercentageRefresh::Eager
        } else {
            PercentageRefresh::Deferred
        },
        ..TallyOptions::default()
    };
    let mut session = TallySession::from_snapshot(&registry, options)?;

    let start = Instant::now();
    for (position, vote) in votes.iter().enumerate() {
        session.apply_vote(vote, &registry).map_err(|e| {
            format!("vote {} (voter {}) rejected: {}", position + 1, vote.voter_id, e)
        })?;
    }
    session.refresh_percentages();
    println!(
        "⏱️  Applied {} votes in {:.2} ms",
        votes.len().to_string().bright_green(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    display::print_ranking(session.candidates(), None);
    let summary = reports::summarize(&session, Some(loaded.digest))?;
    display::print_summary(&summary);

    if let Some(dir) = export_dir {
        let written = export::export_all(&session, dir)?;
        println!(
            "💾 Wrote {} files to {}",
            written.len().to_string().bright_green(),
            dir.display().to_string().bright_green()
        );
    }

    Ok(summary.integrity.is_ok())
}
