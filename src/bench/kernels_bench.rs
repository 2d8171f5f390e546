//! Criterion comparison of the multiplication kernels, without counters.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use matbench::kernels::{Kernel, Variant};
use matbench::matrix::Matrix;

fn kernels() -> Vec<Kernel> {
    let threads = std::thread::available_parallelism().map_or(2, |n| n.get().min(8));
    vec![
        Kernel::Naive,
        Kernel::Line,
        Kernel::new(Variant::Block, Some(64), None).unwrap(),
        Kernel::new(Variant::ParallelOuter, None, Some(threads)).unwrap(),
        Kernel::new(Variant::ParallelInner, None, Some(threads)).unwrap(),
    ]
}

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("matmul");
    group.sample_size(10);

    for n in [128, 256] {
        let a = Matrix::try_ones(n).unwrap();
        let b = Matrix::try_row_ramp(n).unwrap();
        group.throughput(Throughput::Elements((2 * n * n * n) as u64));

        for kernel in kernels() {
            group.bench_with_input(BenchmarkId::new(kernel.to_string(), n), &n, |bench, &n| {
                bench.iter(|| {
                    let mut c = Matrix::try_zeroed(n).unwrap();
                    kernel.multiply(black_box(&a), black_box(&b), &mut c);
                    c
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_kernels);
criterion_main!(benches);
