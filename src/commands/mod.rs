mod inspect;
mod query;
mod replay;
mod tally;

pub use inspect::inspect;
pub use query::{query, QueryTarget};
pub use replay::replay;
pub use tally::tally;

use colored::*;
use std::path::Path;
use vote_tally::formats::{self, LoadedSnapshot};

fn load_snapshot(path: &Path) -> Result<LoadedSnapshot, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("Snapshot does not exist: {}", path.display()).into());
    }
    let loaded = formats::read_snapshot(path)?;
    println!(
        "📂 Loaded {} ({} candidates, {} centers, sha1 {})",
        path.display().to_string().bright_cyan(),
        loaded.snapshot.candidates.len().to_string().bright_yellow(),
        loaded.snapshot.centers.len().to_string().bright_yellow(),
        loaded.digest[..12].dimmed()
    );
    Ok(loaded)
}
