//! Offline Dash entry point
//!
//! Headless demo driver: wires a session to stub collaborators, lets a
//! small reflex bot play at a fixed 60 Hz step and prints the run summary.
//! Real hosts supply their own renderer, clock and scheduler.

use std::cell::Cell;
use std::rc::Rc;

use offline_dash::consts::MS_PER_FRAME;
use offline_dash::platform::DestRect;
use offline_dash::sprites::SpriteRect;
use offline_dash::{
    Clock, Dimensions, FrameHandle, FrameScheduler, Game, GameConfig, InputEvent, Platform,
    Renderer, Sound, SoundPlayer,
};

/// Clock the driver advances by hand.
struct StepClock(Rc<Cell<f64>>);

impl Clock for StepClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

/// Single-slot scheduler: the driver loop runs whatever frame is pending.
struct SlotScheduler {
    next_id: Cell<u64>,
    pending: Rc<Cell<Option<u64>>>,
}

impl FrameScheduler for SlotScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.pending.set(Some(id));
        FrameHandle(id)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending.get() == Some(handle.0) {
            self.pending.set(None);
        }
    }
}

/// Counts draw requests instead of drawing.
struct CountingRenderer(Rc<Cell<u64>>);

impl Renderer for CountingRenderer {
    fn clear(&mut self) {}
    fn blit(&mut self, _src: SpriteRect, _dst: DestRect, _opacity: f32) {
        self.0.set(self.0.get() + 1);
    }
}

struct LogSound;

impl SoundPlayer for LogSound {
    fn play(&mut self, sound: Sound) {
        log::debug!("sound cue: {sound:?}");
    }
}

/// Jump over whatever is closest; hold the key briefly for a full arc.
struct ReflexBot {
    hold_frames: u32,
}

impl ReflexBot {
    fn new() -> Self {
        Self { hold_frames: 0 }
    }

    fn drive(&mut self, game: &mut Game) {
        if self.hold_frames > 0 {
            self.hold_frames -= 1;
            if self.hold_frames == 0 {
                game.on_input(InputEvent::JumpReleased);
            }
            return;
        }

        let speed = game.current_speed();
        let player_x = game.player().pos().x;
        let should_jump = game
            .horizon()
            .front_obstacle()
            .map(|o| {
                let lead = o.pos().x - player_x;
                lead > 0.0 && lead < speed * 14.0
            })
            .unwrap_or(false);

        if should_jump && !game.player().is_jumping() {
            game.on_input(InputEvent::JumpPressed);
            self.hold_frames = 12;
        }
    }
}

fn main() {
    env_logger::init();

    let time = Rc::new(Cell::new(0.0));
    let pending = Rc::new(Cell::new(None));
    let blits = Rc::new(Cell::new(0));

    let platform = Platform {
        clock: Box::new(StepClock(time.clone())),
        scheduler: Box::new(SlotScheduler {
            next_id: Cell::new(0),
            pending: pending.clone(),
        }),
        renderer: Box::new(CountingRenderer(blits.clone())),
        sound: Box::new(LogSound),
    };

    let mut game = Game::new(GameConfig::default(), Dimensions::default(), platform, 0x0DA5);
    let mut bot = ReflexBot::new();

    // Kick the session off with a first jump.
    game.on_input(InputEvent::JumpPressed);
    game.on_input(InputEvent::JumpReleased);

    // Two minutes of simulated time, or until the bot crashes.
    let max_frames = (120_000.0_f32 / MS_PER_FRAME) as u64;
    let mut frames = 0u64;
    while pending.get().is_some() && frames < max_frames {
        pending.set(None);
        time.set(time.get() + MS_PER_FRAME as f64);
        game.update();
        bot.drive(&mut game);
        frames += 1;
    }

    println!("frames simulated: {frames}");
    println!("distance: {} units", game.current_distance());
    println!("high score: {} px", game.high_score());
    println!("final speed: {:.2}", game.current_speed());
    println!("draw requests: {}", blits.get());
    println!("crashed: {}", game.is_crashed());
    for (rank, run) in game.leaderboard().entries().iter().enumerate() {
        println!(
            "  #{:<2} {:>6} units (play {}, speed {:.2})",
            rank + 1,
            run.score,
            run.play_index,
            run.peak_speed
        );
    }
}
