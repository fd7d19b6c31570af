//! Cube Field headless demo
//!
//! Drives the simulation at a fixed frame rate without a renderer and logs
//! what a presentation layer would draw. Useful for eyeballing split/glitch
//! behavior and as a living example of the embedding contract: feed the
//! controller a monotonic clock, poll the render feed after each frame.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cube_field::FieldConfig;
    use cube_field::sim::{CubeField, FieldPhase, Viewport};
    use std::time::{SystemTime, UNIX_EPOCH};

    env_logger::init();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let cfg = FieldConfig::default();
    let view = Viewport::new(1_280.0, 720.0);

    log::info!(
        "cube field starting: seed={seed}, viewport {}x{}, config {}",
        view.w,
        view.h,
        cfg.to_json().unwrap_or_default()
    );

    let mut field = CubeField::new(seed, &cfg, view);

    // 60 simulated seconds at 60 fps
    let frame = 1.0 / 60.0;
    let mut now = 0.0_f64;
    let mut bounces = 0u32;
    let mut splits = 0u32;
    let mut glitches = 0u32;

    for _ in 0..3_600 {
        now += frame;
        let report = field.advance(&cfg, now);

        if report.glitch_started {
            glitches += 1;
            log::info!("[{now:7.2}s] glitch: field cleared");
        }
        if report.resumed {
            let cube = &field.cubes()[0];
            log::info!(
                "[{now:7.2}s] resumed with a {} px cube at ({:.0}, {:.0})",
                cube.size,
                cube.pos.x,
                cube.pos.y
            );
        }
        if report.structure_changed && field.phase() == FieldPhase::Running && !report.resumed {
            splits += 1;
            log::debug!(
                "[{now:7.2}s] split: {} cubes live, {} impacts",
                field.cubes().len(),
                field.impacts().len()
            );
        }
        bounces += field.impacts().len() as u32;
    }

    log::info!(
        "done: {} cubes live, {} split frames, {} glitches, {} impact-frames observed",
        field.cubes().len(),
        splits,
        glitches,
        bounces
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is platform-agnostic; the demo loop is native-only.
}
