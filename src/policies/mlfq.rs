//! Multi-Level Feedback Queue.

use std::collections::VecDeque;

use super::{Dispatch, RunningSlot, SchedulingPolicy};
use crate::process::Process;

/// Colas `Q0 > Q1 > ... > Q(N-1)` con quantum creciente por nivel.
///
/// - Los procesos nuevos entran en `Q0`.
/// - Un proceso que agota su quantum en el nivel `k` baja a `min(k+1, N-1)`.
/// - Cada `boost_interval` unidades todos los procesos no completados vuelven
///   a `Q0`; el que está en CPU recibe un quantum nuevo de nivel 0 desde el
///   instante del boost.
/// - Siempre se atiende el nivel no vacío más alto, con Round Robin dentro
///   del nivel.
#[derive(Debug)]
pub struct MlfqPolicy {
    queues: Vec<VecDeque<usize>>,
    quanta: Vec<u64>,
    boost_interval: u64,
    next_boost: u64,
}

impl MlfqPolicy {
    /// Crea la política. `quanta` debe tener al menos un nivel y valores
    /// positivos; `boost_interval` debe ser positivo. La validación la hace
    /// `SchedulingAlgorithm::build`.
    pub fn new(quanta: Vec<u64>, boost_interval: u64) -> Self {
        Self {
            queues: vec![VecDeque::new(); quanta.len()],
            quanta,
            boost_interval,
            next_boost: boost_interval,
        }
    }

    pub fn levels(&self) -> usize {
        self.quanta.len()
    }

    pub fn quantum_for(&self, level: usize) -> u64 {
        self.quanta[level.min(self.levels() - 1)]
    }

    fn slice_for(&self, process: &Process) -> u64 {
        process.remaining_time.min(self.quantum_for(process.mlfq_level))
    }

    /// Longitud de la cola de un nivel.
    pub fn queue_len(&self, level: usize) -> usize {
        self.queues.get(level).map_or(0, VecDeque::len)
    }
}

impl SchedulingPolicy for MlfqPolicy {
    fn name(&self) -> &'static str {
        "MLFQ"
    }

    fn admit(&mut self, index: usize, processes: &mut [Process]) {
        processes[index].mlfq_level = 0;
        self.queues[0].push_back(index);
    }

    fn select_next(
        &mut self,
        _now: u64,
        running: Option<RunningSlot>,
        processes: &[Process],
    ) -> Option<Dispatch> {
        if let Some(slot) = running {
            // Sólo ocurre tras un boost: el nivel ya es 0 y el quantum se renueva.
            return Some(Dispatch::new(slot.index, self.slice_for(&processes[slot.index])));
        }

        let index = self.queues.iter_mut().find_map(VecDeque::pop_front)?;
        Some(Dispatch::new(index, self.slice_for(&processes[index])))
    }

    fn on_preempt(&mut self, index: usize, processes: &mut [Process]) {
        let process = &mut processes[index];
        let level = (process.mlfq_level + 1).min(self.levels() - 1);
        if level != process.mlfq_level {
            log::trace!("[MLFQ] {} baja al nivel {}", process.name, level);
        }
        process.mlfq_level = level;
        self.queues[level].push_back(index);
    }

    fn next_boost_at(&self) -> Option<u64> {
        Some(self.next_boost)
    }

    fn boost(&mut self, now: u64, running: Option<usize>, processes: &mut [Process]) {
        let (top, lower) = self.queues.split_at_mut(1);
        let mut moved = 0;
        for queue in lower.iter_mut() {
            for index in queue.drain(..) {
                processes[index].mlfq_level = 0;
                top[0].push_back(index);
                moved += 1;
            }
        }
        if let Some(index) = running {
            processes[index].mlfq_level = 0;
        }

        self.next_boost = (now / self.boost_interval)
            .saturating_add(1)
            .saturating_mul(self.boost_interval);
        log::debug!(
            "[BOOST] t={}: {} procesos vuelven a Q0, próximo boost en t={}",
            now,
            moved,
            self.next_boost
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::test_support::{ready_processes, run};

    fn preempt(policy: &mut MlfqPolicy, processes: &mut [Process], index: usize) {
        processes[index].mark_preempted();
        policy.on_preempt(index, processes);
    }

    #[test]
    fn test_demotion_on_quantum_exhaustion() {
        let mut processes = ready_processes(&[(1, 0, 20, 0)]);
        let mut policy = MlfqPolicy::new(vec![2, 4, 8], 100);
        policy.admit(0, &mut processes);

        assert_eq!(policy.select_next(0, None, &processes), Some(Dispatch::new(0, 2)));
        run(&mut processes, 0, 0, 2);
        preempt(&mut policy, &mut processes, 0);
        assert_eq!(processes[0].mlfq_level, 1);

        assert_eq!(policy.select_next(2, None, &processes), Some(Dispatch::new(0, 4)));
        run(&mut processes, 0, 2, 4);
        preempt(&mut policy, &mut processes, 0);
        assert_eq!(processes[0].mlfq_level, 2);

        assert_eq!(policy.select_next(6, None, &processes), Some(Dispatch::new(0, 8)));
        run(&mut processes, 0, 6, 8);
        preempt(&mut policy, &mut processes, 0);
        // El último nivel no baja más
        assert_eq!(processes[0].mlfq_level, 2);
        assert_eq!(policy.queue_len(2), 1);
    }

    #[test]
    fn test_higher_level_served_first() {
        let mut processes = ready_processes(&[(1, 0, 10, 0), (2, 3, 1, 0)]);
        let mut policy = MlfqPolicy::new(vec![2, 4], 100);
        policy.admit(0, &mut processes);
        policy.select_next(0, None, &processes);
        run(&mut processes, 0, 0, 2);
        preempt(&mut policy, &mut processes, 0);

        policy.admit(1, &mut processes);
        assert_eq!(policy.select_next(3, None, &processes), Some(Dispatch::new(1, 1)));
        assert_eq!(policy.select_next(4, None, &processes), Some(Dispatch::new(0, 4)));
    }

    #[test]
    fn test_boost_resets_levels_and_schedules_next() {
        let mut processes = ready_processes(&[(1, 0, 30, 0), (2, 0, 30, 0), (3, 0, 30, 0)]);
        let mut policy = MlfqPolicy::new(vec![2, 4, 8], 10);
        for index in 0..3 {
            policy.admit(index, &mut processes);
        }
        for index in 0..3 {
            policy.select_next(0, None, &processes);
            run(&mut processes, index, 0, 2);
            preempt(&mut policy, &mut processes, index);
        }
        assert_eq!(policy.queue_len(1), 3);

        // El índice 0 está en CPU durante el boost
        let dispatched = policy.select_next(6, None, &processes).unwrap();
        assert_eq!(dispatched.index, 0);
        processes[0].mark_running(6);

        assert_eq!(policy.next_boost_at(), Some(10));
        policy.boost(10, Some(0), &mut processes);

        assert!(processes.iter().all(|p| p.mlfq_level == 0));
        assert_eq!(policy.queue_len(0), 2);
        assert_eq!(policy.queue_len(1), 0);
        assert_eq!(policy.next_boost_at(), Some(20));

        let slot = RunningSlot { index: 0, slice_left: 1 };
        assert_eq!(
            policy.select_next(10, Some(slot), &processes),
            Some(Dispatch::new(0, 2))
        );
    }

    #[test]
    fn test_boost_schedule_saturates_at_clock_end() {
        let mut processes = ready_processes(&[(1, 0, 5, 0)]);
        let mut policy = MlfqPolicy::new(vec![2], u64::MAX / 2 + 1);

        policy.boost(u64::MAX - 1, None, &mut processes);
        assert_eq!(policy.next_boost_at(), Some(u64::MAX));
    }
}
