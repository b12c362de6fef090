use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tsp_encoder::{ResponseEncoder, encode_to_string};
use tsp_tests::{long_reply, sample_exercises};
use tsp_types::TurnMetadata;
use tsp_wire::{Frame, escape};

fn bench_encode_turn(c: &mut Criterion) {
    let fragments = long_reply(40);
    let metadata = TurnMetadata::new()
        .with_category("food")
        .with_word("manzana")
        .with_word_progress("writing")
        .with_exercises(sample_exercises());

    c.bench_function("encode_turn", |b| {
        b.iter(|| encode_to_string(&fragments, &metadata).unwrap());
    });
}

fn bench_escape(c: &mut Criterion) {
    let mut group = c.benchmark_group("escape");
    let plain = "plain ascii text without anything to escape ".repeat(64);
    let dense = "\"quoted\"\\path\\\n\t".repeat(64);

    group.bench_function("plain", |b| b.iter(|| escape(&plain)));
    group.bench_function("escape_dense", |b| b.iter(|| escape(&dense)));
    group.finish();
}

fn bench_encode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_throughput");

    for words in [100, 1_000, 10_000] {
        let fragments = long_reply(words);
        let bytes: usize = fragments.iter().map(String::len).sum();
        group.throughput(Throughput::Bytes(bytes as u64));

        group.bench_with_input(
            BenchmarkId::new("legacy", words),
            &fragments,
            |b, fragments| {
                b.iter(|| {
                    let mut encoder = ResponseEncoder::new();
                    let mut out = String::with_capacity(bytes * 2);
                    for fragment in fragments {
                        encoder.fragment(fragment, &mut out).unwrap();
                    }
                    encoder.finish(&TurnMetadata::new(), &mut out).unwrap();
                    out
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("framed", words),
            &fragments,
            |b, fragments| {
                b.iter(|| {
                    let mut out = Vec::with_capacity(bytes * 2);
                    for fragment in fragments {
                        Frame::delta(fragment).write_to(&mut out);
                    }
                    Frame::end().write_to(&mut out);
                    out
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_turn,
    bench_escape,
    bench_encode_throughput
);
criterion_main!(benches);
