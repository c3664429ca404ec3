//! Stress tests for datamon
//!
//! Run with: cargo test --release stress -- --ignored

use datamon::*;
use std::time::Instant;

#[test]
#[ignore] // Run manually with --ignored
fn stress_test_histogram_fill() {
    let profile = Profile::default();
    let mut monitor = TpcMonitor::new(&profile).unwrap();

    let iterations = 5_000_000;
    let start = Instant::now();

    for i in 0..iterations {
        let channel = i % profile.num_charge_channels;
        let value = 1000 + ((i * 7919) % 3200) as i32;
        monitor.fill_charge(channel, value).unwrap();
    }

    let elapsed = start.elapsed();
    let rate = iterations as f64 / elapsed.as_secs_f64();

    println!("Filled {} values in {:?}", iterations, elapsed);
    println!("Rate: {:.0} fills/second", rate);

    let entries: u64 = monitor
        .charge_histograms()
        .iter()
        .map(Histogram::entries)
        .sum();
    assert_eq!(entries, iterations as u64);
    assert!(
        rate > 1_000_000.0,
        "Should fill at least 1M values/s, got {:.0}",
        rate
    );
}

#[test]
#[ignore]
fn stress_test_monitor_cycle() {
    let profile = Profile::default();
    let mut producer = TpcMonitor::new(&profile).unwrap();
    let mut consumer = TpcMonitor::new(&profile).unwrap();

    let cycles = 2_000;
    let start = Instant::now();

    for cycle in 0..cycles {
        for channel in 0..profile.num_light_channels {
            producer
                .fill_light(channel, 1500 + (cycle * channel) as i32 % 2700)
                .unwrap();
        }
        let words = producer.serialize();
        let rest = consumer.deserialize(&words).unwrap();
        assert!(rest.is_empty());
        producer.clear();
    }

    let elapsed = start.elapsed();
    let rate = cycles as f64 / elapsed.as_secs_f64();

    println!("Ran {} telemetry cycles in {:?}", cycles, elapsed);
    println!("Rate: {:.0} cycles/second", rate);

    assert!(
        rate > 500.0,
        "Should run at least 500 cycles/s, got {:.0}",
        rate
    );
}

#[test]
#[ignore]
fn stress_test_charge_event_packing() {
    let profile = Profile::default();
    let mut event = TpcMonitorChargeEvent::new(&profile);
    let mut decoded = TpcMonitorChargeEvent::new(&profile);
    let frame: Vec<u32> = (0..profile.num_charge_samples as u32)
        .map(|i| (i * 31) & 0xFFF)
        .collect();

    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        event.set_channel_number(i % 192);
        event.set_charge_samples(&frame).unwrap();
        decoded.deserialize(&event.serialize()).unwrap();
    }

    let elapsed = start.elapsed();
    let rate = iterations as f64 / elapsed.as_secs_f64();

    println!("Packed {} frames in {:?}", iterations, elapsed);
    println!("Rate: {:.0} frames/second", rate);

    assert_eq!(decoded.charge_samples(), frame);
    assert!(
        rate > 50_000.0,
        "Should pack at least 50k frames/s, got {:.0}",
        rate
    );
}
