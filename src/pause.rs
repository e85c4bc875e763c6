/// Pause flag plus an optional armed countdown. When the countdown runs out
/// the game unpauses and the armed action is handed back exactly once.
#[derive(Clone, Debug)]
pub struct Pause<A> {
    paused: bool,
    timer: f32,
    pause_time: Option<f32>,
    action: Option<A>,
}

impl<A> Pause<A> {
    pub fn new(paused: bool) -> Self {
        Self {
            paused,
            timer: 0.0,
            pause_time: None,
            action: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_armed(&self) -> bool {
        self.pause_time.is_some()
    }

    /// Player-driven toggle. Ignored while a timed freeze is running.
    pub fn toggle(&mut self) {
        if self.is_armed() {
            return;
        }
        self.paused = !self.paused;
    }

    pub fn hold(&mut self) {
        self.paused = true;
    }

    /// Pauses for `secs` and replaces any pending action.
    pub fn arm(&mut self, secs: f32, action: A) {
        self.paused = true;
        self.timer = 0.0;
        self.pause_time = Some(secs);
        self.action = Some(action);
    }

    pub fn update(&mut self, dt: f32) -> Option<A> {
        let pause_time = self.pause_time?;
        self.timer += dt;
        if self.timer < pause_time {
            return None;
        }
        self.timer = 0.0;
        self.paused = false;
        self.pause_time = None;
        self.action.take()
    }
}
