use std::time::{Duration, Instant};

use crossterm::event::{self, Event};

use crate::command::play::app::PlayApp;

/// Simulated time per match step.
pub(super) const STEP: Duration = Duration::from_micros(16_667);
/// Steps run back to back at most; a longer stall is dropped, not replayed.
const MAX_CATCH_UP_STEPS: u32 = 8;

/// Turns wall-clock time into a whole number of fixed match steps.
#[derive(Debug, Clone)]
pub(super) struct StepClock {
    step: Duration,
    last: Instant,
    pending: Duration,
}

impl StepClock {
    pub(super) fn new(step: Duration, now: Instant) -> Self {
        Self {
            step,
            last: now,
            pending: Duration::ZERO,
        }
    }

    /// Banks the time since the last call and returns how many steps are due.
    pub(super) fn advance(&mut self, now: Instant) -> u32 {
        self.pending += now.saturating_duration_since(self.last);
        self.last = now;

        let mut steps = 0;
        while self.pending >= self.step {
            if steps == MAX_CATCH_UP_STEPS {
                self.pending = Duration::ZERO;
                break;
            }
            self.pending -= self.step;
            steps += 1;
        }
        steps
    }

    pub(super) fn time_until_next_step(&self, now: Instant) -> Duration {
        let banked = self.pending + now.saturating_duration_since(self.last);
        self.step.saturating_sub(banked)
    }
}

/// Runs the match in the terminal until the player quits.
///
/// Keys are handled as they arrive, the match advances in [`STEP`]s and the
/// screen is redrawn after anything changed.
pub(super) fn run(app: &mut PlayApp) -> anyhow::Result<()> {
    ratatui::run(|terminal| {
        let mut clock = StepClock::new(STEP, Instant::now());
        let mut dirty = true;
        while !app.should_exit() {
            if dirty {
                terminal.draw(|frame| app.draw(frame))?;
                dirty = false;
            }

            if event::poll(clock.time_until_next_step(Instant::now()))? {
                match event::read()? {
                    Event::Resize(..) => dirty = true,
                    event => {
                        if let Some(key) = event.as_key_event() {
                            app.handle_key(key.code);
                            dirty = true;
                        }
                    }
                }
            }

            let steps = clock.advance(Instant::now());
            for _ in 0..steps {
                app.step(STEP);
            }
            dirty |= steps > 0;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_clock_counts_whole_steps() {
        let start = Instant::now();
        let mut clock = StepClock::new(10 * MS, start);
        assert_eq!(clock.time_until_next_step(start), 10 * MS);

        assert_eq!(clock.advance(start + 4 * MS), 0);
        assert_eq!(clock.time_until_next_step(start + 4 * MS), 6 * MS);

        assert_eq!(clock.advance(start + 25 * MS), 2);
        assert_eq!(clock.time_until_next_step(start + 25 * MS), 5 * MS);
        assert_eq!(clock.time_until_next_step(start + 40 * MS), Duration::ZERO);
    }

    #[test]
    fn test_clock_drops_long_stalls() {
        let start = Instant::now();
        let mut clock = StepClock::new(10 * MS, start);
        assert_eq!(clock.advance(start + Duration::from_secs(5)), MAX_CATCH_UP_STEPS);
        let after = start + Duration::from_secs(5);
        assert_eq!(clock.time_until_next_step(after), 10 * MS);
        assert_eq!(clock.advance(after + 10 * MS), 1);
    }
}
