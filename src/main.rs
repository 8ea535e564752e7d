use cookie_shelf::{AppContext, CommandOutcome, ElementTable, StorefrontConfig, ViewportSize, SHOP};
use std::time::Instant;

const DEFAULT_FRAMES: usize = 240;
const PRINT_INTERVAL: usize = 60;
const FRAME_DT: f32 = 1.0 / 60.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let frames = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<usize>().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let config = StorefrontConfig::from_env()?;
    let viewport = ViewportSize::new(1280.0, 800.0);
    let mut ctx = AppContext::from_config(config, viewport)?;
    let mut elements = ElementTable::new();

    println!("Running headless storefront for {frames} frames...");

    let start_time = Instant::now();
    let mut steps = 0u64;
    for frame in 0..frames {
        let stats = ctx.frame(FRAME_DT, &mut elements);
        steps += u64::from(stats.steps);

        if frame == frames / 2 {
            if let CommandOutcome::Applied(kicked) = ctx.display_mut().scatter() {
                println!("frame {:>4}: scattered {kicked} cookies", frame + 1);
            }
            if let Some(first) = ctx.catalog().items().first().map(|item| item.id) {
                ctx.add_to_cart(first);
            }
        }

        if frame % PRINT_INTERVAL == 0 || frame == frames - 1 {
            println!("frame {:>4}: {} steps", frame + 1, steps);
            for (_, element) in elements.iter() {
                if let Some(transform) = element.transform {
                    println!("    {:<28} {}", element.label, transform);
                }
            }
        }
    }

    if let Some(message) = ctx.cart().notification() {
        println!("{message}");
    }
    println!(
        "cart: {} items, total ${:.2}",
        ctx.cart().count(),
        ctx.cart().total_cents() as f64 / 100.0
    );

    ctx.navigate(SHOP);
    let mut transition_frames = 0;
    while ctx.transitions().is_animating() {
        ctx.frame(FRAME_DT, &mut elements);
        transition_frames += 1;
    }
    println!(
        "navigated to {} in {transition_frames} frames, {} bodies left",
        SHOP,
        ctx.display().body_count()
    );

    let duration = start_time.elapsed();
    println!("Simulation complete.");
    println!("Total time: {:.2} seconds", duration.as_secs_f64());
    println!("Steps per second: {:.2}", steps as f64 / duration.as_secs_f64());
    Ok(())
}
