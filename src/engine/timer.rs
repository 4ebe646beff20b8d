use crate::types::RoundNo;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// The single deferred deadline of the current round.
///
/// The engine arms it when a round starts and cancels it when the round
/// leaves `players-selecting` by any other means. The task that actually
/// sleeps is spawned by the party handle and attached afterwards, so the
/// engine itself never needs a runtime.
#[derive(Debug, Default)]
pub struct RoundTimer {
    armed: Option<ArmedTimer>,
}

#[derive(Debug)]
struct ArmedTimer {
    round_no: RoundNo,
    deadline: Instant,
    task: Option<AbortHandle>,
}

impl RoundTimer {
    /// Arm for a new round, cancelling whatever was pending
    pub fn arm(&mut self, round_no: RoundNo, deadline: Instant) {
        self.cancel();
        self.armed = Some(ArmedTimer {
            round_no,
            deadline,
            task: None,
        });
    }

    /// Cancel the pending timer; returns the round it belonged to
    pub fn cancel(&mut self) -> Option<RoundNo> {
        let armed = self.armed.take()?;
        if let Some(task) = armed.task {
            task.abort();
        }
        tracing::debug!("Cancelled round timer for round {}", armed.round_no);
        Some(armed.round_no)
    }

    /// Consume the timer when its deadline has passed.
    /// Returns false for a stale firing (cancelled or re-armed since).
    pub fn expire(&mut self, round_no: RoundNo) -> bool {
        match &self.armed {
            Some(armed) if armed.round_no == round_no => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    /// Armed timer that has no task sleeping on it yet
    pub fn unscheduled(&self) -> Option<(RoundNo, Instant)> {
        self.armed
            .as_ref()
            .filter(|a| a.task.is_none())
            .map(|a| (a.round_no, a.deadline))
    }

    /// Attach the sleeping task for `round_no`. A task for anything other
    /// than the currently armed round is aborted straight away.
    pub fn attach(&mut self, round_no: RoundNo, task: AbortHandle) {
        match &mut self.armed {
            Some(armed) if armed.round_no == round_no && armed.task.is_none() => {
                armed.task = Some(task);
            }
            _ => task.abort(),
        }
    }

    pub fn armed_round(&self) -> Option<RoundNo> {
        self.armed.as_ref().map(|a| a.round_no)
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
