// benches/blocking_benchmark.rs
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use corr_db::reduce::{block_samples, DuplicateResolver};
use corr_db::*;

const NT: usize = 48;
const TSRC: u32 = 4;

fn samples(trajectories: u32) -> Vec<Sample> {
    let mut out = Vec::with_capacity((trajectories * TSRC) as usize);
    for traj in 0..trajectories {
        for t in 0..TSRC {
            let seed = (traj * TSRC + t) as f64;
            let values = (0..NT).map(|i| (-(i as f64) * 0.1).exp() * (1.0 + 1e-3 * seed)).collect();
            out.push(Sample { id: ConfigurationId::new('a', 100 + traj * 6, t * 12), values });
        }
    }
    out
}

fn benchmark_blocking(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_samples");

    for trajectories in [100u32, 1000, 5000].iter() {
        let input = samples(*trajectories);
        group.throughput(Throughput::Elements(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(trajectories), &input, |b, input| {
            b.iter(|| block_samples(input, TSRC as usize, 4 * TSRC as usize).unwrap());
        });
    }

    group.finish();
}

fn benchmark_dedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_duplicates");

    for trajectories in [100u32, 1000].iter() {
        let mut input = samples(*trajectories);
        // every tenth measurement was ingested twice
        let repeats: Vec<Sample> = input.iter().step_by(10).cloned().collect();
        input.extend(repeats);
        input.sort_by_key(|s| s.id);

        group.throughput(Throughput::Elements(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(trajectories), &input, |b, input| {
            b.iter(|| DuplicateResolver::default().resolve(input.clone()).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_blocking, benchmark_dedup);
criterion_main!(benches);
