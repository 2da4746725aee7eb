//! Fire Pong demo entry point
//!
//! Runs a headless match with the autopilot on the left paddle against the
//! chosen opponent tier, logging the score once per second.
//!
//! Usage: `fire-pong [tier] [seconds] [seed] [paddle speed]`
//!
//! The tier is a name (`easy` .. `impossible`) or an index 0-4. The paddle
//! speed (`slow`, `normal`, `fast`) caps how fast the autopilot may move.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::thread;
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    use fire_pong::sim::Side;
    use fire_pong::{LogicThread, MatchConfig, PaddleSpeed, TickInput, Tier};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let tier = args
        .next()
        .and_then(|a| Tier::from_str(&a).or_else(|| a.parse::<u8>().ok().map(Tier::from_index)))
        .unwrap_or(Tier::Normal);
    let seconds = args.next().and_then(|a| a.parse::<u64>().ok()).unwrap_or(60);
    let seed = args.next().and_then(|a| a.parse::<u64>().ok()).unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    let paddle_speed = args
        .next()
        .and_then(|a| PaddleSpeed::from_str(&a))
        .unwrap_or_default();

    let config = MatchConfig {
        ai_difficulty: tier.index(),
        paddle_speed,
        ..Default::default()
    }
    .sanitized();
    log::info!(
        "Fire Pong demo: autopilot vs {} for up to {}s (seed {}, {} paddles)",
        config.tier().as_str(),
        seconds,
        seed,
        config.paddle_speed.as_str()
    );

    let logic = match LogicThread::spawn(config, seed) {
        Ok(logic) => logic,
        Err(e) => {
            log::error!("Failed to start logic thread: {}", e);
            std::process::exit(1);
        }
    };
    logic.set_input(TickInput {
        idle_mode: true,
        ..Default::default()
    });

    let deadline = Instant::now() + Duration::from_secs(seconds);
    while Instant::now() < deadline {
        thread::sleep(Duration::from_secs(1));
        let snap = logic.snapshot();
        log::info!(
            "tick {:>6}  {:>2} - {:<2}  rally {:>2}  fire {:.2}",
            snap.tick,
            snap.score(Side::Left),
            snap.score(Side::Right),
            snap.rally_hits,
            snap.fire.intensity
        );
        if snap.match_complete {
            break;
        }
    }

    let final_snapshot = logic.snapshot();
    let state = logic.shutdown();
    if let Some(state) = &state {
        log::info!(
            "Longest rally {} hits over {:.0}s",
            state.rally.longest(),
            fire_pong::ticks_to_secs(state.tick.saturating_sub(state.match_start_tick))
        );
    }
    match serde_json::to_string_pretty(&*final_snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the embedding page on wasm
}
