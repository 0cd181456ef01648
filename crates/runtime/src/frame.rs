use foundation::time::Time;

/// Deterministic frame metadata.
///
/// The clock collaborator hands one of these to the engine per rendered frame;
/// `time` is what `StatMap::update` receives.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (seconds).
    pub dt_s: f64,
    /// Time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self::starting_at(Time::ZERO, index, dt_s)
    }

    pub fn starting_at(origin: Time, index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(origin.0 + index as f64 * dt_s),
        }
    }
}

/// Fixed-rate, monotonic frame source.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Time,
    dt_s: f64,
    next_index: u64,
}

impl FrameClock {
    pub fn new(fps: f64) -> Self {
        Self::with_origin(Time::ZERO, fps)
    }

    pub fn with_origin(origin: Time, fps: f64) -> Self {
        Self {
            origin,
            dt_s: 1.0 / fps.max(1.0),
            next_index: 0,
        }
    }

    pub fn dt_s(&self) -> f64 {
        self.dt_s
    }

    pub fn tick(&mut self) -> Frame {
        let frame = Frame::starting_at(self.origin, self.next_index, self.dt_s);
        self.next_index += 1;
        frame
    }
}
