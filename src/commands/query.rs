use super::load_snapshot;
use colored::*;
use std::path::Path;
use vote_tally::model::Category;
use vote_tally::reports::{self, display};
use vote_tally::{TallyOptions, TallySession};

pub enum QueryTarget {
    Id(i64),
    Name(String),
    Above(u64),
    Leader,
}

pub fn query(
    snapshot_path: &Path,
    category: Category,
    target: QueryTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_snapshot(snapshot_path)?;
    let session = TallySession::from_snapshot(&loaded.snapshot, TallyOptions::default())?;
    let index = session.index(category);

    match target {
        QueryTarget::Id(id) => match index.get(id) {
            Some(record) => display::print_record(index, record),
            None => println!("🔍 No {} with id {}", category, id.to_string().bright_yellow()),
        },
        QueryTarget::Name(name) => match index.find_by_name(&name) {
            Some(record) => display::print_record(index, record),
            None => println!("🔍 No {} named {}", category, name.bright_yellow()),
        },
        QueryTarget::Above(min_votes) => {
            let mut found = 0;
            for record in reports::above_threshold(index, min_votes) {
                display::print_record(index, record);
                found += 1;
            }
            println!(
                "🔍 {} {} records above {} votes",
                found.to_string().bright_green(),
                category,
                min_votes
            );
        }
        QueryTarget::Leader => match reports::leader(index, category) {
            Some(record) => display::print_record(index, record),
            None => println!("🔍 No {} records", category),
        },
    }
    Ok(())
}
