use criterion::{criterion_group, criterion_main};

use detrend::{bench_basis, bench_detrend};

criterion_group!(benches_detrend, bench_basis, bench_detrend);
criterion_main!(benches_detrend);
