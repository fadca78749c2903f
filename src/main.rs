//! Kick Survival headless runner
//!
//! Plays an autopilot session against the built-in kinematic physics and
//! prints a JSON run summary.
//!
//! Usage: `kick-survival [tuning.json] [seed] [seconds]`

use anyhow::Context;
use serde::Serialize;

use kick_survival::Tuning;
use kick_survival::consts::FRAME_DT;
use kick_survival::sim::{GameEvent, GameState, KinematicWorld, Phase, RewardChoice, TickInput, tick};

const DEFAULT_SEED: u64 = 0x5eed;
const DEFAULT_RUN_SECONDS: f32 = 180.0;
/// Progress log cadence (frames)
const REPORT_EVERY: u64 = 600;

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    seconds: f32,
    phase: Phase,
    phases_cleared: u32,
    rewards: Vec<RewardChoice>,
    spawned: u64,
    elites: u32,
    kills: u32,
    alive: usize,
    player_health: i32,
    kicks: u32,
    damage_taken: i32,
}

impl RunSummary {
    fn new(seed: u64) -> Self {
        Self {
            seed,
            ticks: 0,
            seconds: 0.0,
            phase: Phase::Playing,
            phases_cleared: 0,
            rewards: Vec::new(),
            spawned: 0,
            elites: 0,
            kills: 0,
            alive: 0,
            player_health: 0,
            kicks: 0,
            damage_taken: 0,
        }
    }

    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::RewardApplied { choice } => self.rewards.push(*choice),
            GameEvent::EnemySpawned { elite: true, .. } => self.elites += 1,
            GameEvent::BallKicked { .. } => self.kicks += 1,
            GameEvent::PlayerDamaged { amount, .. } => self.damage_taken += amount,
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Kick Survival (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load(&path).with_context(|| format!("failed to load tuning from {path}"))?,
        None => Tuning::default(),
    };
    let seed = match args.next() {
        Some(s) => s.parse::<u64>().with_context(|| format!("invalid seed {s:?}"))?,
        None => DEFAULT_SEED,
    };
    let seconds = match args.next() {
        Some(s) => s.parse::<f32>().with_context(|| format!("invalid duration {s:?}"))?,
        None => DEFAULT_RUN_SECONDS,
    };

    let mut physics = KinematicWorld::for_arena(&tuning.spawn.arena);
    let mut state = GameState::new(seed, tuning, &mut physics);
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    let mut summary = RunSummary::new(seed);
    let frames = (seconds.max(0.0) / FRAME_DT).round() as u64;
    for frame in 1..=frames {
        tick(&mut state, &input, &mut physics, FRAME_DT);
        for event in state.drain_events() {
            log::trace!("{}", serde_json::to_string(&event)?);
            summary.record(&event);
        }

        if frame % REPORT_EVERY == 0 {
            log::info!(
                "t={:>4.0}s phase={:?} timer={} alive={} health={} kills={}",
                frame as f32 * FRAME_DT,
                state.phase(),
                state.session.timer_label(),
                state.alive_enemies(),
                state.player.health,
                state.kills
            );
        }
        if state.phase() == Phase::GameOver {
            break;
        }
    }

    summary.ticks = state.time_ticks;
    summary.seconds = state.clock.unscaled_time();
    summary.phase = state.phase();
    summary.phases_cleared = state.session.phases_cleared();
    summary.spawned = state.spawner.spawned_total();
    summary.kills = state.kills;
    summary.alive = state.alive_enemies();
    summary.player_health = state.player.health;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
