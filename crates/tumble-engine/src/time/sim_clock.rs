use std::time::Instant;

/// Source of simulated time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TimeMode {
    /// Seconds of real time since the clock was created.
    WallClock,
    /// A fixed increment per frame, independent of real time.
    ///
    /// Used while capturing so the written sequence has a stable frame rate
    /// no matter how long each frame takes to render and save.
    FixedStep { step: f32 },
}

/// Simulated-time snapshot for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimTime {
    /// Simulated seconds driving animation.
    pub seconds: f32,

    /// 1-based frame counter.
    pub frame: u64,
}

/// Frame clock producing `SimTime` snapshots.
#[derive(Debug, Clone)]
pub struct SimClock {
    mode: TimeMode,
    start: Instant,
    frame: u64,
}

impl SimClock {
    pub fn new(mode: TimeMode) -> Self {
        Self {
            mode,
            start: Instant::now(),
            frame: 0,
        }
    }

    pub fn wall_clock() -> Self {
        Self::new(TimeMode::WallClock)
    }

    pub fn fixed_step(step: f32) -> Self {
        debug_assert!(step > 0.0);
        Self::new(TimeMode::FixedStep { step })
    }

    pub fn mode(&self) -> TimeMode {
        self.mode
    }

    /// Advances one frame.
    pub fn tick(&mut self) -> SimTime {
        self.tick_at(Instant::now())
    }

    /// Advances one frame as if the current instant were `now`.
    pub fn tick_at(&mut self, now: Instant) -> SimTime {
        self.frame = self.frame.wrapping_add(1);

        // Fixed step multiplies rather than accumulates so frame N lands on
        // exactly `step * N` regardless of how many frames came before.
        let seconds = match self.mode {
            TimeMode::WallClock => now.saturating_duration_since(self.start).as_secs_f32(),
            TimeMode::FixedStep { step } => step * self.frame as f32,
        };

        SimTime {
            seconds,
            frame: self.frame,
        }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::wall_clock()
    }
}
