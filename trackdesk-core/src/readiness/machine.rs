//! Probe sequencing as an explicit state machine
//!
//! The machine only decides what happens next; the driver in the parent
//! module performs the sleeps and HTTP calls and feeds the outcomes back.

use std::time::Duration;

use super::ProbeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbePhase {
    WarmingUp,
    Polling { attempt: u32, url_index: usize },
    BetweenRounds { next_attempt: u32 },
    Ready { attempt: u32 },
    Exhausted { attempts: u32 },
}

/// What the driver should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeAction {
    Sleep(Duration),
    Probe { attempt: u32, url_index: usize },
    Ready { attempt: u32 },
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct ProbeMachine {
    warmup: Duration,
    interval: Duration,
    max_attempts: u32,
    url_count: usize,
    phase: ProbePhase,
}

impl ProbeMachine {
    pub fn new(config: &ProbeConfig, url_count: usize) -> Self {
        Self {
            warmup: config.warmup,
            interval: config.interval,
            max_attempts: config.max_attempts,
            url_count,
            phase: ProbePhase::WarmingUp,
        }
    }

    pub fn phase(&self) -> ProbePhase {
        self.phase
    }

    /// The action for the current phase.
    pub fn action(&self) -> ProbeAction {
        match self.phase {
            ProbePhase::WarmingUp => ProbeAction::Sleep(self.warmup),
            ProbePhase::BetweenRounds { .. } => ProbeAction::Sleep(self.interval),
            ProbePhase::Polling { attempt, url_index } => ProbeAction::Probe { attempt, url_index },
            ProbePhase::Ready { attempt } => ProbeAction::Ready { attempt },
            ProbePhase::Exhausted { attempts } => ProbeAction::Exhausted { attempts },
        }
    }

    /// A requested sleep finished.
    pub fn on_delay_elapsed(&mut self) -> ProbeAction {
        match self.phase {
            ProbePhase::WarmingUp => self.begin_round(1),
            ProbePhase::BetweenRounds { next_attempt } => self.begin_round(next_attempt),
            _ => {}
        }
        self.action()
    }

    /// A probe finished; `ready` is true for a 2xx response.
    pub fn on_probe(&mut self, ready: bool) -> ProbeAction {
        let ProbePhase::Polling { attempt, url_index } = self.phase else {
            return self.action();
        };

        self.phase = if ready {
            ProbePhase::Ready { attempt }
        } else if url_index + 1 < self.url_count {
            ProbePhase::Polling {
                attempt,
                url_index: url_index + 1,
            }
        } else if attempt < self.max_attempts {
            ProbePhase::BetweenRounds {
                next_attempt: attempt + 1,
            }
        } else {
            ProbePhase::Exhausted { attempts: attempt }
        };
        self.action()
    }

    fn begin_round(&mut self, attempt: u32) {
        self.phase = if attempt > self.max_attempts || self.url_count == 0 {
            ProbePhase::Exhausted {
                attempts: attempt.saturating_sub(1).min(self.max_attempts),
            }
        } else {
            ProbePhase::Polling {
                attempt,
                url_index: 0,
            }
        };
    }
}
