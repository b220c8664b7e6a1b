/**
 * Example: Dither an image file
 *
 * Creates a radial gradient, saves it, then dithers it at its full size and
 * resized to 64 pixels.
 *
 * Run with:
 *   cargo run --example dither_image --release
 */

use greedy_dither::{dither_file, DitherConfig, DitherOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Greedy Dithering Example\n");

    // Create a simple test gradient image
    println!("Step 1: Creating test gradient image...");
    let size = 160u32;
    let center = (size - 1) as f32 / 2.0;
    let max_dist = (2.0 * center * center).sqrt();

    let gradient = image::RgbImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        let value = ((1.0 - (dx * dx + dy * dy).sqrt() / max_dist) * 255.0) as u8;
        image::Rgb([value, value, value])
    });
    gradient.save("example-gradient.png")?;
    println!("  ✓ Created test gradient image\n");

    // Dither at full size
    println!("Step 2: Dithering at full size...");
    let result = dither_file(
        "example-gradient.png",
        "example-dithered.png",
        &DitherOptions::default(),
    )?;
    println!(
        "  ✓ Saved {}×{} to example-dithered.png\n",
        result.width, result.height
    );

    // Dither resized, with a progress bar
    println!("Step 3: Dithering resized to 64 pixels...");
    let options = DitherOptions {
        size: Some(64),
        config: DitherConfig {
            verbose: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let result = dither_file("example-gradient.png", "example-dithered-64.png", &options)?;
    println!(
        "  ✓ Saved {}×{} to example-dithered-64.png\n",
        result.width, result.height
    );

    println!("✓ All examples completed!");
    println!("\nGenerated files:");
    println!("  - example-gradient.png (test gradient)");
    println!("  - example-dithered.png (full size)");
    println!("  - example-dithered-64.png (resized)");

    Ok(())
}
