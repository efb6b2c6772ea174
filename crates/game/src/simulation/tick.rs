/// Turns wall-clock frame time into a whole number of fixed ticks.
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            dt: 1.0 / tick_rate as f32,
            accumulator: 0.0,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn accumulate(&mut self, delta: f32) {
        self.accumulator += delta.min(0.25);
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            true
        } else {
            false
        }
    }
}

/// Game clock. It only moves in whole ticks, so every server-side time
/// comparison sees the same value for the whole tick.
#[derive(Debug, Clone, Default)]
pub struct Timing {
    tick: u32,
    frame_start_time: f32,
    delta_time: f32,
}

impl Timing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: f32) {
        self.tick = self.tick.wrapping_add(1);
        self.frame_start_time += dt;
        self.delta_time = dt;
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn time(&self) -> f32 {
        self.frame_start_time
    }

    pub fn frame_start_time(&self) -> f32 {
        self.frame_start_time
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }
}
