use std::time::Instant;

/// Decides which host loop iterations get profiled.
///
/// - `every == 0`: never.
/// - `every == 1`: every iteration.
/// - `every == n`: one iteration in `n`.
#[derive(Debug, Default)]
pub struct TickProfiler {
    every: u32,
    counter: u32,
}

impl TickProfiler {
    pub fn sampling_every(every: u32) -> Self {
        Self { every, counter: 0 }
    }

    pub fn set_sampling(&mut self, every: u32) {
        self.every = every;
        self.counter = 0;
    }

    /// Starts the stopwatch for one iteration. Unsampled iterations get an inert stopwatch.
    pub fn begin(&mut self, name: &'static str) -> TickStopwatch {
        let sampled = self.every > 0 && {
            self.counter = (self.counter + 1) % self.every;
            self.counter == 0
        };
        TickStopwatch::new(name, sampled)
    }
}

/// Sampled begin/end logging with elapsed times, closed on drop.
///
/// Spans are sequential: starting a span ends the previous one.
pub struct TickStopwatch {
    name: &'static str,
    started: Option<Instant>,
    span: Option<(&'static str, Instant)>,
}

impl TickStopwatch {
    pub fn new(name: &'static str, sampled: bool) -> Self {
        if sampled {
            log::debug!("--------- {name} begin ---------");
        }
        Self {
            name,
            started: sampled.then(Instant::now),
            span: None,
        }
    }

    pub fn span(&mut self, section: &'static str) {
        if self.started.is_none() {
            return;
        }
        self.end_span();
        self.span = Some((section, Instant::now()));
    }

    pub fn end_span(&mut self) {
        if let Some((section, started)) = self.span.take() {
            log::debug!("{section}: {:?}", started.elapsed());
        }
    }

    pub fn is_sampled(&self) -> bool {
        self.started.is_some()
    }
}

impl Drop for TickStopwatch {
    fn drop(&mut self) {
        let Some(started) = self.started else {
            return;
        };
        self.end_span();
        log::debug!("event_time: {:?}", started.elapsed());
        log::debug!("---------- {} end ----------", self.name);
    }
}
