use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use geo::polygon;
use panostat::aggregate::polygon_time_stats;
use panostat::grouping::{group_by_location, sort_by_location};
use panostat::stats::assemble_stats;
use panostat::temporal::interval_stats;
use panostat::{CaptureDate, CoordinateSource, MemoryStore, PanoramaRecord, RecordStore};

fn synthetic_records(count: usize) -> Vec<PanoramaRecord> {
    let mut records = Vec::with_capacity(count);
    for i in 0..count {
        // Three panoramas per location, walking northeast.
        let step = (i / 3) as f64;
        let x = 4.0 + step * 0.0005;
        let y = 52.0 + step * 0.0005;
        let date = CaptureDate::new(2008 + (i % 12) as i32, 1 + (i % 12) as u32).unwrap();
        records.push(PanoramaRecord::new(
            "1011",
            format!("pano-{}", i),
            date,
            (x, y),
            (x, y),
        ));
    }
    sort_by_location(&mut records, CoordinateSource::Pano);
    records
}

fn benchmark_grouping(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouping");

    for size in [1_000, 10_000] {
        let records = synthetic_records(size);

        group.bench_with_input(
            BenchmarkId::new("group_by_location", size),
            &records,
            |b, records| {
                b.iter(|| group_by_location(black_box(records), CoordinateSource::Pano, Some(6)))
            },
        );
    }

    group.finish();
}

fn benchmark_stat_assembly(c: &mut Criterion) {
    let records = synthetic_records(10_000);
    let groups = group_by_location(&records, CoordinateSource::Pano, Some(6));

    c.bench_function("assemble_stats_10k", |b| {
        b.iter(|| assemble_stats(black_box(&groups), CoordinateSource::Pano).unwrap())
    });

    let dates: Vec<CaptureDate> = records.iter().map(|r| r.capture_date).collect();
    c.bench_function("interval_stats_10k", |b| {
        b.iter(|| interval_stats(black_box(&dates)).unwrap())
    });
}

fn benchmark_polygon_aggregation(c: &mut Criterion) {
    let mut store = MemoryStore::new();
    for record in synthetic_records(10_000) {
        store.insert("bench", record).unwrap();
    }

    let poly = polygon![
        (x: 4.2, y: 52.2),
        (x: 4.8, y: 52.2),
        (x: 4.8, y: 52.8),
        (x: 4.2, y: 52.8),
    ];

    c.bench_function("polygon_time_stats_10k", |b| {
        b.iter(|| {
            polygon_time_stats(black_box(&store), "bench", black_box(&poly))
                .unwrap()
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    benchmark_grouping,
    benchmark_stat_assembly,
    benchmark_polygon_aggregation
);
criterion_main!(benches);
