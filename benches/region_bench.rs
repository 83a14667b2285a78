use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use mmap_region::{FlushMode, FlushPolicy, MapOptions, MappedRegion, Protection};
use std::fs::File;

const SIZES: [usize; 3] = [4 * 1024, 64 * 1024, 1024 * 1024];

// Backing file of `size` bytes, removed when dropped
fn backing(size: usize) -> File {
    let file = tempfile::tempfile().expect("tempfile");
    file.set_len(size as u64).expect("set_len");
    file
}

fn bench_map_unmap(b: &mut Criterion) {
    let mut group = b.benchmark_group("map_unmap");
    for &size in &SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |ben, &sz| {
            let file = backing(sz);
            ben.iter_batched(
                || (),
                |()| {
                    let mut region =
                        MappedRegion::map(&file, 0, sz as u64, Protection::ReadWrite).expect("map");
                    region.unmap().expect("unmap");
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_write_flush(b: &mut Criterion) {
    let mut group = b.benchmark_group("write_flush");
    for &size in &SIZES {
        group.throughput(Throughput::Bytes(size as u64));

        // Variant A: writes without flush (caller controls durability)
        group.bench_with_input(BenchmarkId::new("write_only", size), &size, |ben, &sz| {
            let file = backing(sz);
            let mut region = MappedRegion::map(&file, 0, sz as u64, Protection::ReadWrite).expect("map");
            let payload = vec![0xAB_u8; sz];
            ben.iter(|| {
                region.write_at(&payload, 0).expect("write");
                criterion::black_box(&payload);
            });
        });

        // Variant B: write then flush, one msync per iteration
        group.bench_with_input(BenchmarkId::new("write_plus_flush", size), &size, |ben, &sz| {
            let file = backing(sz);
            let mut region = MappedRegion::map(&file, 0, sz as u64, Protection::ReadWrite).expect("map");
            let payload = vec![0xAC_u8; sz];
            ben.iter(|| {
                region.write_at(&payload, 0).expect("write");
                region.flush(FlushMode::Sync).expect("flush");
            });
        });

        // Variant C: byte-threshold implicit flushing
        group.bench_with_input(BenchmarkId::new("write_threshold", size), &size, |ben, &sz| {
            let file = backing(sz);
            let mut region = MapOptions::new()
                .len(sz as u64)
                .flush_policy(FlushPolicy::EveryBytes(sz))
                .map(&file)
                .expect("map with threshold");
            let payload = vec![0xAD_u8; sz];
            ben.iter(|| {
                region.write_at(&payload, 0).expect("write");
            });
        });
    }
    group.finish();
}

fn bench_clean_flush(b: &mut Criterion) {
    let mut group = b.benchmark_group("clean_flush");
    group.bench_function("elided_msync_1MB", |ben| {
        let file = backing(1024 * 1024);
        let mut region = MappedRegion::map(&file, 0, 1024 * 1024, Protection::ReadWrite).expect("map");
        ben.iter(|| {
            region.flush(FlushMode::Sync).expect("flush");
        });
    });
    group.finish();
}

fn bench_read_at(b: &mut Criterion) {
    let mut group = b.benchmark_group("read_at");
    for &size in &SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |ben, &sz| {
            let file = backing(sz);
            let mut region = MappedRegion::map(&file, 0, sz as u64, Protection::ReadWrite).expect("map");
            region.write_at(&vec![1u8; sz], 0).expect("seed");

            let mut buf = vec![0u8; sz];
            ben.iter(|| {
                region.read_at(&mut buf, 0).expect("read_at");
                criterion::black_box(&buf);
            });
        });
    }
    group.finish();
}

fn bench_u64(b: &mut Criterion) {
    let mut group = b.benchmark_group("u64");
    group.bench_function("write_read_4096_slots", |ben| {
        let file = backing(4096 * 8);
        let mut region = MappedRegion::map(&file, 0, 4096 * 8, Protection::ReadWrite).expect("map");
        ben.iter(|| {
            let mut sum = 0u64;
            for slot in 0..4096u64 {
                region.write_u64_at(slot, slot * 8).expect("write");
                sum = sum.wrapping_add(region.read_u64_at(slot * 8).expect("read"));
            }
            criterion::black_box(sum);
        });
    });
    group.finish();
}

#[cfg(feature = "advise")]
fn bench_advise(b: &mut Criterion) {
    use mmap_region::Advice;
    let mut group = b.benchmark_group("advise");
    group.bench_function("sequential_4MB", |ben| {
        let file = backing(4 * 1024 * 1024);
        let region =
            MappedRegion::map(&file, 0, 4 * 1024 * 1024, Protection::ReadOnly).expect("map");
        ben.iter(|| {
            region.advise(Advice::Sequential).ok();
        });
    });
    group.finish();
}
#[cfg(not(feature = "advise"))]
fn bench_advise(_: &mut Criterion) {}

fn criterion_config() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .warm_up_time(std::time::Duration::from_millis(300))
        .measurement_time(std::time::Duration::from_secs(3))
}

criterion_group! {
    name = region_benches;
    config = criterion_config();
    targets =
        bench_map_unmap,
        bench_write_flush,
        bench_clean_flush,
        bench_read_at,
        bench_u64,
        bench_advise
}

criterion_main!(region_benches);
