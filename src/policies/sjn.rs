//! Shortest Job Next (no expropiativo).

use super::{Dispatch, RunningSlot, SchedulingPolicy};
use crate::process::Process;

/// Elige el proceso listo con menor `burst_time`; empates por llegada y luego id.
#[derive(Debug, Default)]
pub struct SjnPolicy {
    ready: Vec<usize>,
}

impl SjnPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulingPolicy for SjnPolicy {
    fn name(&self) -> &'static str {
        "SJN"
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
        if let Some(slot) = running {
            return Some(Dispatch::resume(slot));
        }

        let position = self
            .ready
            .iter()
            .enumerate()
            .min_by_key(|&(_, &index)| {
                let p = &processes[index];
                (p.burst_time, p.arrival_time, p.id)
            })
            .map(|(position, _)| position)?;

        let index = self.ready.remove(position);
        Some(Dispatch::new(index, processes[index].remaining_time))
    }

    fn on_preempt(&mut self, index: usize, _processes: &mut [Process]) {
        self.ready.push(index);
    }
}
