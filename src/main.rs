//! Bubble Pop headless runner
//!
//! Runs one session against the simulation core with an autoplay popper and
//! prints the final state as JSON. Useful for balancing and soak testing.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use serde::Serialize;

    use bubble_pop::sim::{BubbleKind, GameEvent, GameMode, GamePhase, SessionState, Simulation};
    use bubble_pop::{RoomRecord, Settings};

    /// Frame step fed to the simulation (~60 fps)
    const FRAME_MS: u64 = 16;

    #[derive(Debug, Parser)]
    #[command(name = "bubble-pop", about = "Run a headless Bubble Pop session")]
    struct Args {
        /// classic, timeAttack or survival
        #[arg(long, default_value = "classic")]
        mode: String,
        /// JSON settings file
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Override the RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many seconds of game time (classic never ends on its own)
        #[arg(long, default_value_t = 120)]
        max_seconds: u64,
        /// Autoplay reaction time between pops
        #[arg(long, default_value_t = 250)]
        reaction_ms: u64,
        /// Chance the autoplayer pops a bomb by mistake
        #[arg(long, default_value_t = 0.05)]
        blunder_rate: f32,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Summary<'a> {
        seed: u64,
        player_id: &'a str,
        state: &'a SessionState,
        room: &'a RoomRecord,
    }

    /// Autoplayer: pops the bubble closest to escaping, mostly avoiding bombs
    struct Autoplay {
        rng: Pcg32,
        reaction_ms: u64,
        blunder_rate: f32,
        cooldown_ms: u64,
    }

    impl Autoplay {
        fn choose(&mut self, state: &SessionState, dt_ms: u64) -> Option<bubble_pop::sim::BubbleId> {
            self.cooldown_ms = self.cooldown_ms.saturating_sub(dt_ms);
            if self.cooldown_ms > 0 {
                return None;
            }
            let blunder = self.rng.random::<f32>() < self.blunder_rate;
            let target = state
                .bubbles
                .iter()
                .filter(|b| blunder || b.kind != BubbleKind::Bomb)
                .min_by(|a, b| a.bottom().total_cmp(&b.bottom()))?;
            self.cooldown_ms = self.reaction_ms;
            Some(target.id)
        }
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let args = Args::parse();
        let mode = GameMode::from_str(&args.mode)
            .ok_or_else(|| format!("unknown mode '{}'", args.mode))?;

        let mut settings = match &args.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if args.seed.is_some() {
            settings.seed = args.seed;
        }
        if settings.player.display_name.trim().is_empty() {
            settings.player.display_name = "Autoplay".to_string();
        }

        let mut sim = Simulation::new(&settings);
        let room = std::rc::Rc::new(std::cell::RefCell::new(RoomRecord::new("Headless", 1)));
        room.borrow_mut()
            .join(sim.player_id(), &settings.player.display_name);
        sim.attach_room(Box::new(room.clone()));

        let mut autoplay = Autoplay {
            rng: Pcg32::seed_from_u64(sim.seed() ^ 0x5EED),
            reaction_ms: args.reaction_ms,
            blunder_rate: args.blunder_rate,
            cooldown_ms: 0,
        };

        sim.start(mode);
        let limit_ms = args.max_seconds * 1000;
        let mut game_time_ms = 0;
        while sim.phase() == GamePhase::Running && game_time_ms < limit_ms {
            sim.advance(FRAME_MS);
            game_time_ms += FRAME_MS;

            let target = sim.state().and_then(|s| autoplay.choose(s, FRAME_MS));
            if let Some(id) = target {
                sim.pop(id);
            }

            for event in sim.drain_events() {
                match event {
                    GameEvent::LivesLost { remaining, .. } => {
                        log::info!("Life lost, {} remaining", remaining)
                    }
                    GameEvent::SpawnRateChanged { interval_ms } => {
                        log::info!("Spawn interval now {}ms", interval_ms)
                    }
                    GameEvent::GameOver { reason, score } => {
                        log::info!("Game over ({:?}) with {} points", reason, score)
                    }
                    other => log::trace!("{:?}", other),
                }
            }
        }
        sim.end_game();

        let Some(state) = sim.state() else {
            return Err("session vanished before the summary".into());
        };
        let room = room.borrow();
        let summary = Summary {
            seed: sim.seed(),
            player_id: sim.player_id(),
            state,
            room: &room,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bubble Pop (headless) starting...");

    if let Err(err) = headless::run() {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives `bubble_pop::Simulation` directly
}
