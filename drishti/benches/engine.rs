//! Engine Benchmarks
//!
//! Hot paths of an operator session:
//! - Pixel → map conversion on every pointer move
//! - Live appends with dedup and viewport fit
//! - History loads merging in-flight live points
//!
//! Run with: `cargo bench`
//! View HTML reports in: `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use drishti::core::{GeoPoint, PixelPoint, TelemetrySample};
use drishti::frame::{MapDescriptor, MapFrame, RenderSize};
use drishti::telemetry::{HistoryWindow, PositionRecord, Trajectory};

// ============================================================================
// Fixtures
// ============================================================================

fn benchmark_frame() -> MapFrame {
    MapFrame::new(MapDescriptor::new(-20.0, -15.0, 0.05, 800, 600).unwrap()).unwrap()
}

/// A wandering track around Toulouse, one sample per second.
fn geo_track(n: usize) -> Vec<TelemetrySample<GeoPoint>> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.01;
            TelemetrySample::new(
                GeoPoint::new(43.6 + 0.001 * t.sin(), 1.44 + 0.001 * t),
                1_700_000_000_000 + i as u64 * 1_000,
            )
        })
        .collect()
}

// ============================================================================
// Group 1: Map Frame
// ============================================================================

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let frame = benchmark_frame();
    let rendered = RenderSize::new(1280.0, 960.0);

    group.bench_function("pixel_to_map", |b| {
        let pixel = PixelPoint::new(640.5, 480.25);
        b.iter(|| frame.pixel_to_map(black_box(pixel), black_box(rendered)))
    });

    group.throughput(Throughput::Elements(1000));
    group.bench_function("pixel_to_map_batch_1000", |b| {
        let pixels: Vec<PixelPoint> = (0..1000)
            .map(|i| PixelPoint::new((i % 1300) as f64, (i % 980) as f64))
            .collect();
        b.iter(|| {
            pixels
                .iter()
                .filter_map(|&p| frame.pixel_to_map(black_box(p), rendered))
                .count()
        })
    });

    group.finish();
}

// ============================================================================
// Group 2: Trajectory
// ============================================================================

fn bench_trajectory(c: &mut Criterion) {
    let mut group = c.benchmark_group("trajectory");

    for &n in &[200usize, 2_000] {
        let track = geo_track(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("append_live", n), &track, |b, track| {
            b.iter(|| {
                let mut t = Trajectory::<GeoPoint>::default();
                for s in track {
                    t.append_live(*s);
                    t.fit_viewport_once();
                }
                t.len()
            })
        });

        group.bench_with_input(BenchmarkId::new("load_history_merge", n), &track, |b, track| {
            let (history, live) = track.split_at(n * 3 / 4);
            b.iter(|| {
                let mut t = Trajectory::<GeoPoint>::default();
                for s in live {
                    t.append_live(*s);
                }
                t.load_history(history.iter().copied(), HistoryWindow::default(), 0)
            })
        });

        let records: Vec<PositionRecord> = track
            .iter()
            .map(|s| PositionRecord::geo(s.position.lat, s.position.lng, s.timestamp_ms.unwrap_or(0)))
            .collect();
        group.bench_with_input(BenchmarkId::new("load_history_records", n), &records, |b, records| {
            b.iter(|| {
                let mut t = Trajectory::<GeoPoint>::default();
                t.load_history_records(black_box(records), HistoryWindow::default(), 200)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frame, bench_trajectory);
criterion_main!(benches);
