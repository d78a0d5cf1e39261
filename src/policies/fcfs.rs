//! First-Come First-Served.

use std::collections::VecDeque;

use super::{Dispatch, RunningSlot, SchedulingPolicy};
use crate::process::Process;

/// Cola FIFO única; cada proceso se ejecuta hasta completarse.
///
/// El motor admite los procesos en orden `(arrival_time, id)`, así que la
/// cola queda ordenada por llegada sin necesidad de reordenar.
#[derive(Debug, Default)]
pub struct FcfsPolicy {
    ready_queue: VecDeque<usize>,
}

impl FcfsPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for FcfsPolicy {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn admit(&mut self, index: usize, _processes: &mut [Process]) {
        self.ready_queue.push_back(index);
    }

    fn select_next(
        &mut self,
        _now: u64,
        running: Option<RunningSlot>,
        processes: &[Process],
    ) -> Option<Dispatch> {
        if let Some(slot) = running {
            return Some(Dispatch::resume(slot));
        }

        let index = self.ready_queue.pop_front()?;
        Some(Dispatch::new(index, processes[index].remaining_time))
    }

    fn on_preempt(&mut self, index: usize, _processes: &mut [Process]) {
        // No expropia: si el motor lo hiciera, el proceso conserva su turno.
        self.ready_queue.push_front(index);
    }
}
