use glam::Vec2;
use proptest::prelude::*;

use kick_survival::Tuning;
use kick_survival::consts::FRAME_DT;
use kick_survival::sim::{
    DifficultyCurve, EnemyId, EnemyStore, EnemyTemplate, EntityRegistry, GameState, KinematicWorld, Phase, TickInput,
    tick,
};

fn store_with(n: usize) -> (EnemyStore, Vec<EnemyId>) {
    let mut physics = KinematicWorld::new(Vec2::ZERO, Vec2::splat(50.0));
    let mut store = EnemyStore::new();
    let ids = (0..n)
        .map(|i| {
            store
                .spawn(&EnemyTemplate::default(), Vec2::new(i as f32, 0.0), &mut physics)
                .unwrap()
        })
        .collect();
    (store, ids)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn population_never_exceeds_cap(
        cap in 1i32..10,
        base_batch in 1u32..4,
        extra_batch in 0u32..8,
        interval in 0.05f32..0.5,
        seed in any::<u64>(),
    ) {
        let mut tuning = Tuning::default();
        tuning.spawn.max_alive = cap;
        tuning.spawn.base_batch = base_batch;
        tuning.spawn.max_batch = base_batch + extra_batch;
        tuning.spawn.base_interval = interval;
        tuning.spawn.min_interval = interval * 0.5;
        tuning.spawn.difficulty_curve = DifficultyCurve::linear();
        tuning.player.max_health = 10_000;
        tuning.session.survival_duration = 8.0;

        let mut physics = KinematicWorld::for_arena(&tuning.spawn.arena);
        let mut state = GameState::new(seed, tuning, &mut physics);
        let idle = TickInput::default();
        for _ in 0..(6.0 / FRAME_DT) as usize {
            tick(&mut state, &idle, &mut physics, FRAME_DT);
            prop_assert!(state.alive_enemies() <= cap as usize);
        }
    }

    #[test]
    fn timer_is_monotonic_and_clamped(
        duration in -5.0f32..20.0,
        dts in proptest::collection::vec(0.0f32..0.5, 1..200),
    ) {
        let mut tuning = Tuning::default();
        tuning.session.survival_duration = duration;
        tuning.spawn.templates.clear();
        let mut physics = KinematicWorld::for_arena(&tuning.spawn.arena);
        let mut state = GameState::new(1, tuning, &mut physics);

        let expected = state.session.survival_duration().max(1.0);
        prop_assert_eq!(state.session.time_remaining(), expected);

        let idle = TickInput::default();
        let mut last = state.session.time_remaining();
        for dt in dts {
            tick(&mut state, &idle, &mut physics, dt);
            let now = state.session.time_remaining();
            prop_assert!(now >= 0.0);
            prop_assert!(now <= last);
            if state.phase() != Phase::Playing {
                prop_assert_eq!(now, 0.0);
            }
            last = now;
        }
    }

    #[test]
    fn unregister_is_idempotent(
        n in 1usize..12,
        picks in proptest::collection::vec(0u32..20, 1..10),
    ) {
        let (store, ids) = store_with(n);
        let mut registry = EntityRegistry::new();
        for &id in &ids {
            registry.register(id, &store);
        }

        for raw in picks {
            let id = EnemyId(raw);
            let was_present = registry.contains(id);
            let before = registry.count(&store);

            prop_assert_eq!(registry.unregister(id, &store), was_present);
            let after_first = registry.count(&store);
            prop_assert_eq!(after_first, before - usize::from(was_present));

            prop_assert!(!registry.unregister(id, &store));
            prop_assert_eq!(registry.count(&store), after_first);
        }
    }

    #[test]
    fn curve_output_stays_in_unit_range(
        keys in proptest::collection::vec((-1.0f32..2.0, -3.0f32..3.0), 0..8),
        progress in -10.0f32..10.0,
    ) {
        let curve = DifficultyCurve::new(keys);
        let value = curve.evaluate(progress);
        prop_assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn game_over_is_absorbing(
        inputs in proptest::collection::vec((any::<bool>(), 0usize..4, -1.0f32..1.0, -1.0f32..1.0), 1..120),
    ) {
        let mut tuning = Tuning::default();
        tuning.spawn.templates.clear();
        let mut physics = KinematicWorld::for_arena(&tuning.spawn.arena);
        let mut state = GameState::new(9, tuning, &mut physics);
        prop_assert!(state.game_over());

        for (kick, reward, x, y) in inputs {
            let input = TickInput {
                move_axis: Vec2::new(x, y),
                kick,
                reward: kick_survival::sim::RewardChoice::ALL.get(reward).copied(),
                autopilot: reward == 3,
            };
            tick(&mut state, &input, &mut physics, 0.25);
            prop_assert_eq!(state.phase(), Phase::GameOver);
            prop_assert!(state.clock.is_paused());
        }
        prop_assert!(!state.game_over());
    }
}
