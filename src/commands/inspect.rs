use super::load_snapshot;
use colored::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use vote_tally::model::Category;
use vote_tally::reports::{display, export};
use vote_tally::{TallyOptions, TallySession};

pub fn inspect(
    snapshot_path: &Path,
    category: Category,
    dot_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_snapshot(snapshot_path)?;
    let session = TallySession::from_snapshot(&loaded.snapshot, TallyOptions::default())?;
    let index = session.index(category);

    display::print_tree(index);

    if let Some(path) = dot_path {
        let mut out = BufWriter::new(File::create(path)?);
        export::write_dot(index, &mut out)?;
        out.flush()?;
        println!("💾 Wrote Graphviz tree to {}", path.display().to_string().bright_green());
    }
    Ok(())
}
