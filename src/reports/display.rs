use super::{IntegrityStatus, TallySummary};
use crate::index::{NodeRef, ResultIndex};
use crate::model::ResultRecord;
use colored::*;

const BAR_WIDTH: usize = 40;

/// Ranked table, most votes first. `top` limits the rows shown.
pub fn print_ranking(index: &ResultIndex, top: Option<usize>) {
    let category = index.category();
    println!(
        "\n🏆 {} ranking ({} records, {} votes)",
        category.label().bright_cyan().bold(),
        index.len().to_string().bright_yellow(),
        index.total_votes().to_string().bright_yellow()
    );
    if index.is_empty() {
        println!("   {}", "(no records)".dimmed());
        return;
    }

    let ranked = index.ranked(true);
    let shown = top.unwrap_or(ranked.len()).min(ranked.len());
    println!("   {:>4}  {:>8}  {:<30} {:>10} {:>8}", "Pos", "Id", "Name", "Votes", "%");
    for (position, record) in ranked.iter().take(shown).enumerate() {
        let line = format!(
            "   {:>4}  {:>8}  {:<30} {:>10} {:>7.2}%",
            position + 1,
            record.id,
            record.name,
            record.votes,
            index.percentage_of(record)
        );
        if position == 0 {
            println!("{}", line.bright_green().bold());
        } else {
            println!("{}", line);
        }
    }
    if shown < ranked.len() {
        println!("   {} more not shown", (ranked.len() - shown).to_string().dimmed());
    }
}

pub fn print_record(index: &ResultIndex, record: &ResultRecord) {
    println!(
        "📌 {} {} {}: {} votes ({:.2}%)",
        record.category.label().bright_cyan(),
        record.id.to_string().bright_yellow(),
        record.name.bold(),
        record.votes.to_string().bright_green(),
        index.percentage_of(record)
    );
}

/// Sideways tree: right subtree above its parent, left subtree below.
pub fn print_tree(index: &ResultIndex) {
    println!(
        "\n🌳 {} tree: {} nodes, height {}",
        index.category().label().bright_cyan().bold(),
        index.len().to_string().bright_yellow(),
        index.height().to_string().bright_yellow()
    );
    match index.root() {
        Some(root) => print_subtree(root, 0),
        None => println!("   {}", "(empty)".dimmed()),
    }
}

fn print_subtree(node: NodeRef<'_>, depth: usize) {
    if let Some(right) = node.right() {
        print_subtree(right, depth + 1);
    }
    let record = node.record();
    println!(
        "   {}{} {} [{}] bf={}",
        "      ".repeat(depth),
        record.id.to_string().bright_yellow(),
        record.name,
        record.votes,
        node.balance_factor()
    );
    if let Some(left) = node.left() {
        print_subtree(left, depth + 1);
    }
}

/// Horizontal bars scaled to the leading record.
pub fn print_bar_chart(index: &ResultIndex, top: Option<usize>) {
    let ranked = index.ranked(true);
    let max = match ranked.first() {
        Some(record) if record.votes > 0 => record.votes,
        _ => {
            println!("📊 {}", "No votes to chart".dimmed());
            return;
        }
    };

    println!("\n📊 {} votes", index.category().label().bright_cyan().bold());
    for record in ranked.iter().take(top.unwrap_or(ranked.len())) {
        let width = (record.votes as f64 / max as f64 * BAR_WIDTH as f64).round() as usize;
        println!(
            "   {:<24} {} {} ({:.2}%)",
            record.name,
            "█".repeat(width).bright_blue(),
            record.votes,
            index.percentage_of(record)
        );
    }
}

pub fn print_integrity(status: &IntegrityStatus) {
    match status {
        IntegrityStatus::Ok { total } => println!(
            "✅ Integrity check passed: {} votes in both trees",
            total.to_string().bright_green().bold()
        ),
        IntegrityStatus::Mismatch {
            candidate_votes,
            center_votes,
            expected,
        } => println!(
            "⚠️  {} candidates={} centers={} expected={}",
            "Integrity mismatch:".bright_red().bold(),
            candidate_votes.to_string().bright_yellow(),
            center_votes.to_string().bright_yellow(),
            expected.to_string().bright_yellow()
        ),
    }
}

pub fn print_summary(summary: &TallySummary) {
    println!("\n📋 {}", "Tally summary".bold());
    if let Some(digest) = &summary.snapshot_digest {
        println!("   Snapshot:       {}", digest.dimmed());
    }
    println!("   Registered:     {}", summary.total_voters.to_string().bright_yellow());
    println!("   Valid votes:    {}", summary.valid_votes.to_string().bright_yellow());
    println!("   Ballots:        {}", summary.ballots_processed.to_string().bright_yellow());
    println!("   Participation:  {:.2}%", summary.participation);

    let leaders = [
        ("Candidate", &summary.candidate_leader),
        ("Center", &summary.center_leader),
        ("Region", &summary.region_leader),
    ];
    for (label, leader) in leaders.iter() {
        match leader {
            Some(leader) => println!(
                "   {:<15} {} ({} votes, {:.2}%)",
                format!("{} leader:", label),
                leader.name.bright_green().bold(),
                leader.votes,
                leader.percentage
            ),
            None => println!("   {:<15} {}", format!("{} leader:", label), "none".dimmed()),
        }
    }
    print_integrity(&summary.integrity);
}
