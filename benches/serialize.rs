//! Benchmarks for metric serialization and decoding

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use datamon::bits::{pack, unpack};
use datamon::{
    Histogram, LowBwTpcMonitor, Metric, Profile, Summary, TpcConfigs, TpcMonitor,
    TpcMonitorChargeEvent,
};

fn filled_monitor(profile: &Profile) -> TpcMonitor {
    let mut monitor = TpcMonitor::new(profile).unwrap();
    for i in 0..10_000usize {
        let value = 1000 + ((i * 7919) % 3200) as i32;
        monitor.fill_charge(i % profile.num_charge_channels, value).unwrap();
        monitor.fill_light(i % profile.num_light_channels, value).unwrap();
    }
    monitor
}

fn bench_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram");

    let values: Vec<i32> = (0..1000).map(|i| (i * 37) % 4500).collect();
    group.throughput(Throughput::Elements(1000));

    group.bench_function("fill_1000", |b| {
        let mut hist = Histogram::new(1024, 4096, 16).unwrap();
        b.iter(|| {
            for &v in &values {
                hist.fill(black_box(v));
            }
        })
    });

    group.finish();
}

fn bench_tpc_monitor(c: &mut Criterion) {
    let mut group = c.benchmark_group("tpc_monitor");

    let profile = Profile::default();
    let monitor = filled_monitor(&profile);
    let words = monitor.serialize();
    group.throughput(Throughput::Bytes((words.len() * 4) as u64));

    group.bench_function("serialize", |b| {
        b.iter(|| black_box(monitor.serialize()))
    });

    group.bench_function("deserialize", |b| {
        let mut target = TpcMonitor::new(&profile).unwrap();
        b.iter(|| {
            target.deserialize(black_box(&words)).unwrap();
        })
    });

    group.finish();
}

fn bench_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("packing");

    let profile = Profile::default();
    let frame: Vec<u32> = (0..profile.num_charge_samples as u32)
        .map(|i| (i * 31) & 0xFFF)
        .collect();
    group.throughput(Throughput::Elements(frame.len() as u64));

    group.bench_function("pack_charge_frame", |b| {
        b.iter(|| black_box(pack(black_box(frame.as_slice()))))
    });

    let packed = pack(frame.as_slice());
    group.bench_function("unpack_charge_frame", |b| {
        b.iter(|| black_box(unpack(black_box(&packed))))
    });

    group.bench_function("charge_event_roundtrip", |b| {
        let mut event = TpcMonitorChargeEvent::new(&profile);
        let mut decoded = TpcMonitorChargeEvent::new(&profile);
        b.iter(|| {
            event.set_charge_samples(&frame).unwrap();
            decoded.deserialize(&event.serialize()).unwrap();
        })
    });

    group.bench_function("low_bw_set_values", |b| {
        let mut monitor = LowBwTpcMonitor::new(&profile);
        let baselines: Vec<u32> = (0..profile.num_charge_channels as u32).collect();
        b.iter(|| {
            monitor
                .set_values(Summary::ChargeBaseline, black_box(&baselines))
                .unwrap();
        })
    });

    group.finish();
}

fn bench_configs(c: &mut Criterion) {
    let mut group = c.benchmark_group("configs");

    let configs = TpcConfigs::default();
    let words = configs.serialize();

    group.bench_function("roundtrip", |b| {
        let mut target = TpcConfigs::default();
        b.iter(|| {
            target.deserialize(&configs.serialize()).unwrap();
        })
    });

    group.bench_function("clear", |b| {
        let mut target = TpcConfigs::default();
        b.iter(|| {
            target.deserialize(&words).unwrap();
            target.clear();
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_histogram,
    bench_tpc_monitor,
    bench_packing,
    bench_configs,
);

criterion_main!(benches);
