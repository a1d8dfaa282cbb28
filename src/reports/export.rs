//! CSV, JSON, plain-text and Graphviz renderings of result indices.

use super::{leader, ReportResult};
use crate::index::{NodeRef, ResultIndex};
use crate::model::{Category, ResultRecord};
use crate::tally::TallySession;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "Category;Id;Name;Votes;Percentage";

/// JSON export of one index
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexExport {
    pub category: String,
    pub total_votes: u64,
    pub results: Vec<ExportedResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportedResult {
    pub id: i64,
    pub name: String,
    pub votes: u64,
    pub percentage: f64,
}

impl IndexExport {
    pub fn from_index(index: &ResultIndex) -> Self {
        Self {
            category: index.category().plural().to_string(),
            total_votes: index.total_votes(),
            results: index
                .iter()
                .map(|record| ExportedResult {
                    id: record.id,
                    name: record.name.clone(),
                    votes: record.votes,
                    percentage: round2(index.percentage_of(record)),
                })
                .collect(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Keep names from breaking the `;`-delimited row layout.
fn csv_field(name: &str) -> String {
    lazy_static! {
        static ref CSV_UNSAFE_RX: Regex = Regex::new(r"[;\r\n]+").unwrap();
    }
    CSV_UNSAFE_RX.replace_all(name, " ").into_owned()
}

/// One row per record, ascending by id.
pub fn write_csv<W: Write>(index: &ResultIndex, mut out: W) -> ReportResult<()> {
    writeln!(out, "{}", CSV_HEADER)?;
    for row in csv_rows(index) {
        writeln!(out, "{}", row)?;
    }
    Ok(())
}

pub fn write_json<W: Write>(index: &ResultIndex, mut out: W) -> ReportResult<()> {
    serde_json::to_writer_pretty(&mut out, &IndexExport::from_index(index))?;
    writeln!(out)?;
    Ok(())
}

const RULE: &str = "===================================================";

/// Plain-text final results: elected candidate, general statistics and the
/// candidate ranking.
pub fn write_final_report<W: Write>(
    session: &TallySession,
    generated_at: DateTime<Utc>,
    mut out: W,
) -> ReportResult<()> {
    let candidates = session.candidates();

    writeln!(out, "{}", RULE)?;
    writeln!(out, "              FINAL ELECTION RESULTS")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out)?;

    if let Some(winner) = leader(candidates, Category::Candidate) {
        writeln!(out, "ELECTED CANDIDATE:")?;
        writeln!(out, "  Name: {}", winner.name)?;
        writeln!(out, "  Votes: {}", winner.votes)?;
        writeln!(out, "  Percentage: {:.2}%", candidates.percentage_of(winner))?;
        writeln!(out)?;
    }

    writeln!(out, "GENERAL STATISTICS:")?;
    writeln!(out, "  Registered voters: {}", session.total_voters())?;
    writeln!(out, "  Valid votes: {}", session.valid_votes())?;
    writeln!(out, "  Participation: {:.2}%", session.participation())?;
    writeln!(out)?;

    writeln!(out, "CANDIDATE RANKING:")?;
    writeln!(out, "Pos | Name                     | Votes  | %")?;
    writeln!(out, "----|--------------------------|--------|-------")?;
    for (position, record) in candidates.ranked(true).into_iter().enumerate() {
        writeln!(
            out,
            "{:<4}| {:<25}| {:<7}| {:.2}%",
            position + 1,
            record.name,
            record.votes,
            candidates.percentage_of(record)
        )?;
    }
    Ok(())
}

/// Graphviz digraph of the tree shape, one node per record.
pub fn write_dot<W: Write>(index: &ResultIndex, mut out: W) -> ReportResult<()> {
    writeln!(out, "digraph {} {{", index.category().plural())?;
    writeln!(out, "    node [shape=record];")?;
    if let Some(root) = index.root() {
        write_dot_node(root, &mut out)?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

fn write_dot_node<W: Write>(node: NodeRef<'_>, out: &mut W) -> ReportResult<()> {
    let record = node.record();
    writeln!(
        out,
        "    n{} [label=\"{{{}|{}|{} votes}}\"];",
        record.id,
        record.id,
        dot_label(&record.name),
        record.votes
    )?;
    for child in node.left().into_iter().chain(node.right()) {
        writeln!(out, "    n{} -> n{};", record.id, child.record().id)?;
        write_dot_node(child, out)?;
    }
    Ok(())
}

fn dot_label(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '"' | '\\' | '{' | '}' | '|' | '<' | '>') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn create(path: &Path) -> ReportResult<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Write CSV and JSON files for every category plus `final_report.txt`
/// into `dir`, creating it if needed. Returns the paths written.
pub fn export_all(session: &TallySession, dir: &Path) -> ReportResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for category in Category::ALL.iter().copied() {
        let index = session.index(category);

        let csv_path = dir.join(format!("{}.csv", category.plural()));
        let mut csv = create(&csv_path)?;
        write_csv(index, &mut csv)?;
        csv.flush()?;
        written.push(csv_path);

        let json_path = dir.join(format!("{}.json", category.plural()));
        let mut json = create(&json_path)?;
        write_json(index, &mut json)?;
        json.flush()?;
        written.push(json_path);
    }

    let report_path = dir.join("final_report.txt");
    let mut report = create(&report_path)?;
    write_final_report(session, Utc::now(), &mut report)?;
    report.flush()?;
    written.push(report_path);

    Ok(written)
}

/// CSV data rows without the header, ascending by id.
pub fn csv_rows(index: &ResultIndex) -> Vec<String> {
    index
        .iter()
        .map(|record: &ResultRecord| {
            format!(
                "{};{};{};{};{:.2}",
                index.category().label(),
                record.id,
                csv_field(&record.name),
                record.votes,
                index.percentage_of(record)
            )
        })
        .collect()
}
