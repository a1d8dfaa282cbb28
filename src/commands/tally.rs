use super::load_snapshot;
use colored::*;
use instant::Instant;
use std::path::Path;
use vote_tally::model::Category;
use vote_tally::reports::{self, display, export};
use vote_tally::{RegionCollisionPolicy, TallyOptions, TallySession};

pub fn tally(
    snapshot_path: &Path,
    export_dir: Option<&Path>,
    top: Option<usize>,
    region_collisions: RegionCollisionPolicy,
) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_snapshot(snapshot_path)?;

    let options = TallyOptions {
        region_collisions,
        ..TallyOptions::default()
    };
    let start = Instant::now();
    let session = TallySession::from_snapshot(&loaded.snapshot, options)?;
    println!(
        "🧮 Built {} indices in {:.2} ms",
        Category::ALL.len().to_string().bright_yellow(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    for category in Category::ALL.iter().copied() {
        display::print_ranking(session.index(category), top);
    }
    display::print_bar_chart(session.candidates(), top);

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

    Ok(())
}
