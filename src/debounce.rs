/// Milliseconds on the host's monotonic clock (`performance.now()` in a browser).
pub type Millis = u64;

/// Trailing-edge debouncer driven by an external clock.
///
/// Every `call` replaces the pending value and pushes the deadline out to
/// `now + delay`; `poll` hands the value back once the deadline has passed.
/// Nothing runs on its own: the owner polls it from its tick.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Millis,
    pending: Option<(Millis, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Millis) -> Self {
        Self { delay, pending: None }
    }

    pub fn call(&mut self, now: Millis, value: T) {
        self.pending = Some((now.saturating_add(self.delay), value));
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    pub fn poll(&mut self, now: Millis) -> Option<T> {
        match self.pending {
            Some((at, _)) if at <= now => self.pending.take().map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
