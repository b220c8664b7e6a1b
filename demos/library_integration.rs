/**
 * Example: Using greedy-dither as a library
 *
 * Dithers in memory without file I/O, drives the engine step by step, and
 * compares the queue-based selector against a full rescan.
 *
 * Run with:
 *   cargo run --example library_integration --release
 */

use std::time::Instant;

use greedy_dither::{
    dither, BinaryImage, DitherConfig, DitherEngine, EngineState, FullScan, LightnessImage,
};

fn create_test_image(width: usize, height: usize) -> LightnessImage {
    // Horizontal ramp with a faint vertical ripple
    LightnessImage::from_fn(width, height, |x, y| {
        let ramp = x as f64 / (width - 1) as f64;
        let ripple = 0.05 * (y as f64 * 0.5).sin();
        (ramp + ripple).clamp(0.0, 1.0)
    })
}

fn print_ascii(image: &BinaryImage) {
    for y in 0..image.height {
        let row: String = (0..image.width)
            .map(|x| if image.get(x, y) == 255 { ' ' } else { '#' })
            .collect();
        println!("  {}", row);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Greedy Dither Library Integration Example\n");

    // In-memory dithering
    println!("1. In-memory dithering:");
    let small = create_test_image(48, 12);
    let output = dither(&small)?;
    print_ascii(&output);
    println!();

    // Step-by-step control
    println!("2. Driving the engine step by step:");
    let mut engine = DitherEngine::new(&small, DitherConfig::default())?;
    let mut steps = 0;
    while engine.step()? {
        steps += 1;
        if steps % 144 == 0 {
            println!(
                "  {} / {} pixels resolved, {} still pending",
                engine.resolved(),
                engine.total(),
                engine.field().unresolved_count()
            );
        }
    }
    assert_eq!(engine.state(), EngineState::Done);
    println!(
        "  ✓ Done; selection queue pushed {} entries, skipped {} stale\n",
        engine.selector().pushed(),
        engine.selector().skipped()
    );

    // Queue vs full rescan
    println!("3. Comparing selection strategies (96×96):");
    let larger = create_test_image(96, 96);

    let start = Instant::now();
    let queued = dither(&larger)?;
    let queue_time = start.elapsed();

    let start = Instant::now();
    let scanned = DitherEngine::with_selector(&larger, DitherConfig::default(), FullScan::new())?
        .run()?;
    let scan_time = start.elapsed();

    println!("  Queue:     {:.3}s", queue_time.as_secs_f64());
    println!("  Full scan: {:.3}s", scan_time.as_secs_f64());
    println!(
        "  Outputs {}",
        if queued == scanned { "identical" } else { "DIFFER" }
    );

    println!("\n✓ All examples completed!");

    Ok(())
}
