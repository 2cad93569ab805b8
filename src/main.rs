//! Pattern particles entry point
//!
//! The browser build is driven through `platform::web::WebField`. Natively
//! this runs the simulation headless and logs population statistics:
//!
//! ```text
//! pattern-particles [pattern] [ticks]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use pattern_particles::renderer::FrameData;
    use pattern_particles::sim::{FieldState, TickInput, tick};
    use pattern_particles::{Config, PatternKind};

    const CANVAS: Vec2 = Vec2::new(800.0, 600.0);
    const DEFAULT_TICKS: u64 = 600;
    const REPORT_EVERY: u64 = 60;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let pattern = args
        .next()
        .map(|s| PatternKind::parse(&s))
        .unwrap_or_default();
    let ticks = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TICKS);

    log::info!(
        "Pattern particles (native) starting: pattern '{}', {} ticks",
        pattern.as_str(),
        ticks
    );

    let config = Config {
        pattern,
        ..Default::default()
    };
    let mut state = FieldState::new(0x5EED, CANVAS, config);

    // Sweep a pointer around the canvas center so the force model gets exercised
    let mut expired = 0;
    for t in 0..ticks {
        let angle = t as f32 * 0.02;
        let input = TickInput::with_mouse(CANVAS * 0.5 + Vec2::from_angle(angle) * 150.0);
        let summary = tick(&mut state, &input);
        expired += summary.expired;

        if (t + 1) % REPORT_EVERY == 0 {
            let frame = FrameData::capture(&state);
            let mean_alpha = if frame.particles.is_empty() {
                0.0
            } else {
                frame.particles.iter().map(|p| p.alpha).sum::<f32>() / frame.particles.len() as f32
            };
            log::info!(
                "tick {:>6}: {} particles, {} edges, mean alpha {:.3}",
                t + 1,
                frame.particles.len(),
                frame.edges.len(),
                mean_alpha
            );
        }
    }

    println!(
        "{}: {} ticks, {} particles, {} edges, {} expired, {} spawned, {} sampling failures",
        pattern.as_str(),
        state.time_ticks,
        state.particles().len(),
        state.edges().len(),
        expired,
        state.stats.spawned,
        state.stats.sampling_failures
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
