use glam::Vec2;
use proptest::prelude::*;

use volume_keeper::consts::SIM_DT;
use volume_keeper::sim::audit;
use volume_keeper::sim::{BlockLocation, GamePhase, GameState, Holder, TickInput, tick};
use volume_keeper::{Session, WorldConfig};

/// Check the relationships that must hold after every tick
fn assert_consistent(state: &GameState) {
    assert!(
        (0.0..=state.max_chaos).contains(&state.chaos),
        "chaos {} out of range",
        state.chaos
    );
    assert!(state.kids.len() <= state.max_kids);

    for shelf in &state.shelves {
        for (slot, id) in shelf.slots().iter().enumerate() {
            let Some(id) = id else { continue };
            let block = &state.blocks[id.index()];
            assert_eq!(block.color, shelf.color, "wrong color on shelf {}", shelf.id.0);
            assert_eq!(
                block.location,
                BlockLocation::Shelved {
                    shelf: shelf.id,
                    slot
                }
            );
        }
    }

    for block in &state.blocks {
        match block.location {
            BlockLocation::Shelved { shelf, slot } => {
                assert_eq!(state.shelves[shelf.index()].slot(slot), Some(block.id));
            }
            BlockLocation::Held(Holder::Player) => {
                assert!(state.player.carried.contains(&block.id));
            }
            BlockLocation::Held(Holder::Kid(kid)) => {
                assert_eq!(state.kids[kid.index()].carrying, Some(block.id));
            }
            BlockLocation::Floor => {
                assert!(state.bounds().contains(&block.bounds()));
            }
        }
    }
    assert!(state.player.carried.len() <= state.player.stats.carry_slots);

    for kid in &state.kids {
        assert!(state.bounds().contains(&kid.bounds()));
        for shelf in &state.shelves {
            assert!(!kid.bounds().overlaps(&shelf.bounds), "kid {} inside shelf", kid.id.0);
        }
    }
}

fn input_strategy() -> impl Strategy<Value = (TickInput, usize)> {
    (
        -1i8..=1,
        -1i8..=1,
        any::<bool>(),
        proptest::option::of((0.0f32..1600.0, 0.0f32..1200.0)),
        1usize..120,
    )
        .prop_map(|(x, y, sprint, pointer, hold)| {
            let input = TickInput {
                movement: Vec2::new(x as f32, y as f32),
                pointer: pointer.map(|(px, py)| Vec2::new(px, py)),
                sprint,
                ..Default::default()
            };
            (input, hold)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn state_stays_consistent(
        seed in any::<u64>(),
        script in proptest::collection::vec(input_strategy(), 1..12),
    ) {
        let mut state = GameState::new(WorldConfig::default(), seed);
        for (input, hold) in &script {
            for _ in 0..*hold {
                tick(&mut state, input, SIM_DT);
                assert_consistent(&state);
            }
        }
        prop_assert!(audit::run(&mut state).is_empty());
    }

    #[test]
    fn same_seed_same_outcome(
        seed in any::<u64>(),
        script in proptest::collection::vec(input_strategy(), 1..8),
    ) {
        let mut a = GameState::new(WorldConfig::default(), seed);
        let mut b = GameState::new(WorldConfig::default(), seed);
        for (input, hold) in &script {
            for _ in 0..*hold {
                tick(&mut a, input, SIM_DT);
                tick(&mut b, input, SIM_DT);
            }
        }
        prop_assert_eq!(a.chaos, b.chaos);
        prop_assert_eq!(a.drain_events(), b.drain_events());
        let kids = |s: &GameState| s.kids.iter().map(|k| (k.state, k.pos)).collect::<Vec<_>>();
        prop_assert_eq!(kids(&a), kids(&b));
    }
}

#[test]
fn autopilot_session_runs_to_completion() {
    let config = WorldConfig {
        target_time: 150.0,
        ..Default::default()
    };
    let mut session = Session::new(config, 31337);
    session.set_input(TickInput {
        idle_mode: true,
        ..Default::default()
    });

    let mut frames = 0;
    while !session.is_over() && frames < 20_000 {
        session.update(SIM_DT);
        while session.awaiting_upgrade() {
            let choice = session.offer_upgrades()[0];
            assert!(session.choose_upgrade(choice));
        }
        if frames % 600 == 0 {
            assert_consistent(&session.state);
        }
        frames += 1;
    }

    assert!(session.is_over());
    assert!(matches!(session.state.phase, GamePhase::Won | GamePhase::Lost));
    assert!(session.state.kids.len() >= 3);
    assert!(audit::run(&mut session.state).is_empty());
}

#[test]
fn config_json_drives_world_generation() {
    let config = WorldConfig::from_json_str(
        r#"{
            "worldWidth": 1000,
            "worldHeight": 800,
            "shelfRows": 2,
            "shelfCols": 2,
            "shelfSpacing": [400, 300],
            "shelfCapacity": 4,
            "initialFill": 4,
            "colorPalette": ["orange", "purple"],
            "spawnPoints": [[50, 50]]
        }"#,
    )
    .expect("valid config");
    let state = GameState::new(config, 8);

    assert_eq!(state.shelves.len(), 4);
    assert_eq!(state.blocks.len(), 16);
    assert_consistent(&state);
}
