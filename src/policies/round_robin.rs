//! Round Robin con quantum fijo.

use std::collections::VecDeque;

use super::{Dispatch, RunningSlot, SchedulingPolicy};
use crate::process::Process;

/// Cola circular FIFO con quantum fijo.
///
/// Los procesos que llegan y los expropiados por quantum se unen al final
/// de la cola. Si en el mismo instante llega un proceso y vence un quantum,
/// el recién llegado queda delante (el motor admite antes de expropiar).
#[derive(Debug)]
pub struct RoundRobinPolicy {
    ready_queue: VecDeque<usize>,
    quantum: u64,
}

impl RoundRobinPolicy {
    pub fn new(quantum: u64) -> Self {
        Self {
            ready_queue: VecDeque::new(),
            quantum,
        }
    }

    pub fn quantum(&self) -> u64 {
        self.quantum
    }
}

impl SchedulingPolicy for RoundRobinPolicy {
    fn name(&self) -> &'static str {
        "RR"
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
        let run_for = processes[index].remaining_time.min(self.quantum);
        Some(Dispatch::new(index, run_for))
    }

    fn on_preempt(&mut self, index: usize, _processes: &mut [Process]) {
        log::trace!("[RR] proceso en índice {} vuelve al final de la cola", index);
        self.ready_queue.push_back(index);
    }
}
