use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ocflstore_cache::{
    ContentAddressableCache, DigestCalculator, MaxSizeEvictionStrategy, NeverEvict,
    Sha2Calculator,
};
use std::io::Read;
use std::sync::Arc;
use tempfile::TempDir;

fn benchmark_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("cas_write");

    for size in [1024_usize, 64 * 1024, 1024 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("new_content", size), &size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let cache = ContentAddressableCache::open(
                temp_dir.path(),
                Arc::new(MaxSizeEvictionStrategy::new(64 * 1024 * 1024)),
                Arc::new(Sha2Calculator::sha512()),
            )
            .unwrap();
            let mut counter = 0_u64;
            let mut content = vec![0_u8; size];
            b.iter(|| {
                counter += 1;
                content[..8].copy_from_slice(&counter.to_le_bytes());
                black_box(cache.write("bench.bin", &content).unwrap())
            });
        });
    }

    group.bench_function("hit", |b| {
        let temp_dir = TempDir::new().unwrap();
        let cache = ContentAddressableCache::open(
            temp_dir.path(),
            Arc::new(NeverEvict),
            Arc::new(Sha2Calculator::sha512()),
        )
        .unwrap();
        cache.write("same", b"same content").unwrap();
        b.iter(|| black_box(cache.write("same", b"same content").unwrap()));
    });

    group.finish();
}

fn benchmark_read(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let cache = ContentAddressableCache::open(
        temp_dir.path(),
        Arc::new(NeverEvict),
        Arc::new(Sha2Calculator::sha512()),
    )
    .unwrap();
    let digest = cache.write("read.bin", &vec![7_u8; 64 * 1024]).unwrap();

    c.bench_function("cas_read_64k", |b| {
        let mut buffer = Vec::with_capacity(64 * 1024);
        b.iter(|| {
            buffer.clear();
            cache
                .read_byte_channel(&digest)
                .unwrap()
                .read_to_end(&mut buffer)
                .unwrap();
            black_box(buffer.len())
        });
    });
}

fn benchmark_reopen(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    {
        let cache = ContentAddressableCache::open(
            temp_dir.path(),
            Arc::new(NeverEvict),
            Arc::new(Sha2Calculator::sha256()),
        )
        .unwrap();
        for i in 0..1000 {
            cache.write("entry", format!("entry {i}").as_bytes()).unwrap();
        }
        cache.close().unwrap();
    }

    c.bench_function("cas_replay_1000", |b| {
        b.iter(|| {
            let cache = ContentAddressableCache::open(
                temp_dir.path(),
                Arc::new(NeverEvict),
                Arc::new(Sha2Calculator::sha256()),
            )
            .unwrap();
            let count = cache.count();
            cache.close().unwrap();
            black_box(count)
        });
    });
}

fn benchmark_digest(c: &mut Criterion) {
    let content = vec![42_u8; 1024 * 1024];
    let mut group = c.benchmark_group("digest");
    group.throughput(Throughput::Bytes(content.len() as u64));
    for calculator in [Sha2Calculator::sha256(), Sha2Calculator::sha512()] {
        group.bench_function(calculator.algorithm().as_str(), |b| {
            b.iter(|| black_box(calculator.digest_bytes(&content)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_write,
    benchmark_read,
    benchmark_reopen,
    benchmark_digest
);
criterion_main!(benches);
