//! Shortest Remaining Time First (SJN expropiativo).

use super::{Dispatch, RunningSlot, SchedulingPolicy};
use crate::process::Process;

/// Elige el proceso con menor tiempo restante y expropia en cada llegada
/// si el recién llegado tiene estrictamente menos tiempo restante que el
/// proceso en ejecución. En empate el proceso actual continúa.
#[derive(Debug, Default)]
pub struct SrtfPolicy {
    ready: Vec<usize>,
}

impl SrtfPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posición en `ready` del candidato con menor `(remaining, arrival, id)`.
    fn shortest(&self, processes: &[Process]) -> Option<usize> {
        self.ready
            .iter()
            .enumerate()
            .min_by_key(|&(_, &index)| {
                let p = &processes[index];
                (p.remaining_time, p.arrival_time, p.id)
            })
            .map(|(position, _)| position)
    }
}

impl SchedulingPolicy for SrtfPolicy {
    fn name(&self) -> &'static str {
        "SRTF"
    }

    fn admit(&mut self, index: usize, _processes: &mut [Process]) {
        self.ready.push(index);
    }

    fn select_next(
        &mut self,
        _now: u64,
        running: Option<RunningSlot>,
        processes: &[Process],
    ) -> Option<Dispatch> {
        let position = match (self.shortest(processes), running) {
            (None, None) => return None,
            (None, Some(slot)) => return Some(Dispatch::resume(slot)),
            (Some(position), None) => position,
            (Some(position), Some(slot)) => {
                let candidate = &processes[self.ready[position]];
                if candidate.remaining_time >= processes[slot.index].remaining_time {
                    return Some(Dispatch::resume(slot));
                }
                position
            }
        };

        let index = self.ready.remove(position);
        Some(Dispatch::new(index, processes[index].remaining_time))
    }

    fn on_preempt(&mut self, index: usize, _processes: &mut [Process]) {
        self.ready.push(index);
    }

    fn preempts_on_arrival(&self) -> bool {
        true
    }
}
