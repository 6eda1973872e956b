//! Criterion benchmark for the line-parsing hot path.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rigtel_core::{CalibrationTable, Channel, ChannelSpec, LineParser, SequenceAssigner};

fn bench_parse(c: &mut Criterion) {
    let table = CalibrationTable::with_overrides([(
        Channel::RotationalSpeed,
        ChannelSpec {
            scale: 1.0,
            offset: 0.0,
            min: 0.0,
            max: 20_000.0,
        },
    )]);
    let parser = LineParser::new(table);

    c.bench_function("parse_valid_line", |b| {
        let mut seq = SequenceAssigner::new();
        b.iter(|| {
            let r = parser.parse_at(
                black_box("426.5,24.2,46.3,2.1,12500,0.53"),
                &mut seq,
                None,
            );
            black_box(r).ok();
        })
    });

    c.bench_function("parse_rejected_line", |b| {
        let mut seq = SequenceAssigner::new();
        b.iter(|| {
            let r = parser.parse_at(black_box("426.5,24.2,46.3"), &mut seq, None);
            black_box(r).err();
        })
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
