//! Benchmarks for result index construction, incremental votes and ranking.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vote_tally::model::registry::{CandidateEntry, CenterEntry, RegistrySnapshot, VoteEvent};
use vote_tally::{Category, PercentageRefresh, ResultIndex, ResultRecord, TallyOptions, TallySession};

fn registry(candidates: i64, centers: i64) -> RegistrySnapshot {
    RegistrySnapshot {
        candidates: (1..=candidates)
            .map(|number| CandidateEntry {
                number,
                name: format!("Candidate {}", number),
                party: format!("Party {}", number % 7),
                region: format!("Region {}", number % 11),
                votes: (number as u64 * 37) % 1_000,
            })
            .collect(),
        centers: (1..=centers)
            .map(|id| CenterEntry {
                id,
                location: format!("Center {}", id),
                region: format!("Region {}", id % 11),
                voters_served: 0,
            })
            .collect(),
        total_voters: 1_000_000,
    }
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &size in &[100i64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut index = ResultIndex::new(Category::Candidate);
                for id in 1..=size {
                    let record = ResultRecord::new(id, "candidate", Category::Candidate, id as u64);
                    index.insert(black_box(record)).ok();
                }
                index
            })
        });
    }
    group.finish();
}

fn bench_apply_vote(c: &mut Criterion) {
    let registry = registry(1_000, 200);
    let mut group = c.benchmark_group("apply_vote");
    for (label, percentages) in [
        ("deferred", PercentageRefresh::Deferred),
        ("eager", PercentageRefresh::Eager),
    ] {
        group.bench_function(label, |b| {
            let options = TallyOptions {
                percentages,
                ..TallyOptions::default()
            };
            let mut session = TallySession::from_snapshot(&registry, options).ok();
            let mut voter = 0i64;
            b.iter(|| {
                voter += 1;
                let vote = VoteEvent {
                    voter_id: voter,
                    candidate_number: voter % 1_000 + 1,
                    center_id: voter % 200 + 1,
                };
                if let Some(session) = session.as_mut() {
                    session.apply_vote(black_box(&vote), &registry).ok();
                }
            })
        });
    }
    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let registry = registry(10_000, 1);
    let session = match TallySession::from_snapshot(&registry, TallyOptions::default()) {
        Ok(session) => session,
        Err(e) => panic!("failed to build bench session: {}", e),
    };
    c.bench_function("ranked_10000", |b| {
        b.iter(|| black_box(session.candidates().ranked(true)).len())
    });
}

criterion_group!(benches, bench_insert, bench_apply_vote, bench_ranking);
criterion_main!(benches);
