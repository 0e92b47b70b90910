//! Framer and decode-loop throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use particle_core::codec::{CtdSample, WfpCtdCodec};
use particle_core::framing::{CompositeSieve, DelimitedSieve, FixedLengthSieve, Framer};
use particle_core::source::MemorySource;
use particle_core::stream::{CheckpointedDecoder, MemoryStateStore, StreamKey, VecSink};
use particle_core::trailer::{encode_source, TrailerLayout};

fn wfp_image(records: u32) -> Vec<u8> {
    let recs: Vec<Vec<u8>> = (0..records)
        .map(|i| CtdSample { conductivity: i & 0xFFFF, temperature: 7, pressure: i & 0xFF, oxygen: 3 }.to_bytes().to_vec())
        .collect();
    encode_source(&TrailerLayout::wfp(), &recs, 1_000, 1_000 + records, 0)
}

fn bench_fixed_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("framer_fixed_length");
    for chunk in [64usize, 4096] {
        let data = wfp_image(10_000);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &data, |b, data| {
            b.iter(|| {
                let mut framer = Framer::new(FixedLengthSieve::new(11));
                let mut frames = 0usize;
                for part in data.chunks(chunk) {
                    framer.feed(part);
                    frames += framer.drain().len();
                }
                black_box(frames)
            });
        });
    }
    group.finish();
}

fn bench_composite(c: &mut Criterion) {
    let mut data = Vec::new();
    for i in 0..2_000u32 {
        data.extend_from_slice(&[0xA5, (i & 0xFF) as u8, 0, 1]);
        if i % 10 == 0 {
            data.extend_from_slice(b"<S>battery=12.0\nmode=profile</S>");
        }
    }

    c.bench_function("framer_composite_mixed", |b| {
        b.iter(|| {
            let sieve = CompositeSieve::new()
                .push(DelimitedSieve::new("<S>", "</S>").unwrap())
                .push(FixedLengthSieve::new(4).with_sync(vec![0xA5]));
            let mut framer = Framer::new(sieve);
            framer.feed(black_box(&data));
            black_box(framer.drain().len())
        });
    });
}

fn bench_decoder_pull(c: &mut Criterion) {
    let data = wfp_image(10_000);

    c.bench_function("decoder_pull_10k", |b| {
        b.iter(|| {
            let mut decoder = CheckpointedDecoder::new(
                StreamKey::new("bench", "C0000001.DAT"),
                Box::new(MemorySource::new(data.clone())),
                WfpCtdCodec,
                None,
            )
            .unwrap();
            let mut store = MemoryStateStore::new();
            let mut sink: VecSink<CtdSample> = VecSink::new();
            black_box(decoder.pull(usize::MAX, &mut store, &mut sink).unwrap().emitted)
        });
    });
}

criterion_group!(benches, bench_fixed_length, bench_composite, bench_decoder_pull);
criterion_main!(benches);
