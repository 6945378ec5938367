//! Transfer path benchmarks.
//!
//! Measures the synchronous domain layer directly: a transfer is two
//! record loads, a read-modify-write, and one batched commit.

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use voting_core::{
    candidate::CandidateLedger, transfer::TransferEngine, voter::VoterLedger, Config, MemoryStore,
    RocksStore,
};

fn bench_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer");
    group.throughput(Throughput::Elements(1));

    group.bench_function("memory_store", |b| {
        let store = Arc::new(MemoryStore::new());
        let voters = VoterLedger::new(store.clone());
        let candidates = CandidateLedger::new(store.clone());
        let engine = TransferEngine::new(store);

        voters.create("v1", &u64::MAX.to_string()).unwrap();
        candidates.create("c1", "Alice").unwrap();

        b.iter(|| black_box(engine.transfer("v1", "c1", "1")).unwrap());
    });

    group.bench_function("rocks_store", |b| {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();

        let store = Arc::new(RocksStore::open(&config).unwrap());
        let voters = VoterLedger::new(store.clone());
        let candidates = CandidateLedger::new(store.clone());
        let engine = TransferEngine::new(store);

        voters.create("v1", &u64::MAX.to_string()).unwrap();
        candidates.create("c1", "Alice").unwrap();

        b.iter(|| black_box(engine.transfer("v1", "c1", "1")).unwrap());
    });

    group.finish();
}

fn bench_read_voter(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_voter");
    group.throughput(Throughput::Elements(1));

    group.bench_function("memory_store", |b| {
        let store = Arc::new(MemoryStore::new());
        let voters = VoterLedger::new(store);
        voters.create("v1", "1000").unwrap();

        b.iter(|| black_box(voters.read("v1")).unwrap());
    });

    group.finish();
}

fn bench_voter_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("voter_range");

    for voter_count in [100u32, 1_000] {
        let store = Arc::new(MemoryStore::new());
        let voters = VoterLedger::new(store);
        for i in 0..voter_count {
            voters.create(&format!("v{:06}", i), "100").unwrap();
        }

        group.throughput(Throughput::Elements(voter_count as u64));
        group.bench_function(format!("scan_{}", voter_count), |b| {
            b.iter(|| black_box(voters.read_range("", "")).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transfer, bench_read_voter, bench_voter_range);
criterion_main!(benches);
