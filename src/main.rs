//! Swarm Survivor - headless runner
//!
//! Plays a seeded session with a scripted player and an auto-picking
//! selection menu, then records the high score.
//!
//! Usage: `swarm-survivor [seed] [seconds] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on wasm32
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use glam::Vec2;
    use rand::SeedableRng;
    use rand::seq::IndexedRandom;
    use rand_pcg::Pcg32;

    use swarm_survivor::persistence::JsonFileStore;
    use swarm_survivor::sim::{FixedStep, GameEvent, GamePhase, GameState, MenuKind, PanelInfo, SelectionMenu, TickInput, tick};
    use swarm_survivor::{HighScore, Tuning};

    const SAVE_FILE: &str = "swarm_survivor_save.json";
    /// Host frame time the runner pretends to render at
    const FRAME_DT: f32 = 1.0 / 30.0;

    /// Picks a random offer
    struct AutoPick {
        rng: Pcg32,
    }

    impl SelectionMenu for AutoPick {
        fn choose(&mut self, kind: MenuKind, offers: &[PanelInfo]) -> Option<usize> {
            let indices: Vec<usize> = (0..offers.len()).collect();
            let pick = indices.choose(&mut self.rng).copied();
            if let Some(i) = pick {
                log::info!("{:?} menu: picked '{}' ({})", kind, offers[i].name, offers[i].level_label);
            }
            pick
        }
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        env_logger::init();

        let mut args = std::env::args().skip(1);
        let seed: u64 = match args.next() {
            Some(s) => s.parse()?,
            None => 12345,
        };
        let seconds: f32 = match args.next() {
            Some(s) => s.parse()?,
            None => 120.0,
        };
        let tuning = match args.next() {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };

        log::info!("Swarm Survivor (headless) starting, seed {}", seed);

        let mut store = JsonFileStore::open(SAVE_FILE)?;
        let mut high_score = HighScore::load(&store)?;

        let mut state = GameState::new(&tuning, seed)?;
        let mut menu = AutoPick {
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
        };
        let mut stepper = FixedStep::new();
        let mut kills = 0u32;
        let mut wall_time = 0.0f32;

        while wall_time < seconds && state.phase != GamePhase::GameOver {
            state.resolve_menus(&mut menu);

            // Kite in a slow circle
            let t = state.elapsed * 0.3;
            let input = TickInput {
                move_dir: Vec2::new(t.cos(), t.sin()),
                ..Default::default()
            };
            stepper.advance(FRAME_DT, |dt| tick(&mut state, &input, dt));
            wall_time += FRAME_DT;

            for event in state.drain_events() {
                match event {
                    GameEvent::EnemyKilled(_) => kills += 1,
                    GameEvent::LevelUp { level } => log::info!("Player reached level {}", level),
                    GameEvent::GameEnded { score, level } => {
                        log::info!("Run over: score {}, level {}", score, level)
                    }
                    _ => {}
                }
            }
        }

        let score = state.progression.score();
        if high_score.submit(score, &mut store)? {
            log::info!("New best saved to {}", store.path().display());
        }

        log::info!(
            "Summary: {:.1}s simulated, score {}, level {}, kills {}, alive {}, best {}",
            state.elapsed,
            score,
            state.progression.level(),
            kills,
            state.spawner.population(),
            high_score.best()
        );
        for ability in state.abilities.iter().filter(|a| a.is_active()) {
            log::info!("  {} level {}/{}", ability.name, ability.level(), ability.max_level());
        }
        Ok(())
    }
}
