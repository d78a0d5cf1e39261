//! Round Robin con prioridades.

use std::collections::{BTreeMap, VecDeque};

use super::{Dispatch, RunningSlot, SchedulingPolicy};
use crate::process::Process;

/// Una subcola FIFO por nivel de prioridad, con Round Robin dentro de cada una.
///
/// Siempre se atiende la subcola no vacía de menor valor de prioridad.
/// Un proceso expropiado por quantum vuelve al final de su propia subcola;
/// su prioridad no cambia.
#[derive(Debug)]
pub struct RoundRobinPriorityPolicy {
    ready: BTreeMap<i32, VecDeque<usize>>,
    quantum: u64,
}

impl RoundRobinPriorityPolicy {
    pub fn new(quantum: u64) -> Self {
        Self {
            ready: BTreeMap::new(),
            quantum,
        }
    }

    fn enqueue(&mut self, index: usize, priority: i32) {
        self.ready.entry(priority).or_default().push_back(index);
    }
}

impl SchedulingPolicy for RoundRobinPriorityPolicy {
    fn name(&self) -> &'static str {
        "RR-Priority"
    }

    fn admit(&mut self, index: usize, processes: &mut [Process]) {
        self.enqueue(index, processes[index].priority);
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

        let index = self
            .ready
            .values_mut()
            .find(|queue| !queue.is_empty())
            .and_then(VecDeque::pop_front)?;

        let run_for = processes[index].remaining_time.min(self.quantum);
        Some(Dispatch::new(index, run_for))
    }

    fn on_preempt(&mut self, index: usize, processes: &mut [Process]) {
        self.enqueue(index, processes[index].priority);
    }
}
