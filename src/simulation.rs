//! # Módulo de Simulación Principal
//!
//! Este módulo contiene el motor de simulación: es dueño del tiempo simulado,
//! de los procesos y de la política activa, y recorre los eventos relevantes
//! (llegadas, fin de porción, boosts) moviendo los procesos entre estados y
//! emitiendo la traza de ejecución.
//!
//! El tiempo no avanza de a una unidad: salta directamente al próximo evento.

use serde::Serialize;

use crate::config;
use crate::error::{Result, SchedulerError};
use crate::metrics::{MetricsCalculator, SimulationMetrics};
use crate::policies::{Dispatch, RunningSlot, SchedulingPolicy};
use crate::process::{prepare_processes, Process, ProcessDescriptor, ProcessState};
use crate::scheduler::SchedulingAlgorithm;
use crate::trace::{ExecutionTrace, TraceEvent};

/// Configuración de una simulación: la carga de trabajo y el algoritmo.
///
/// `Simulation` no guarda estado entre ejecuciones; cada llamada a
/// [`Simulation::execute`] crea procesos, política y traza nuevos.
pub struct Simulation {
    /// Descriptores de los procesos a simular
    descriptors: Vec<ProcessDescriptor>,
    /// Algoritmo de planificación a utilizar
    algorithm: SchedulingAlgorithm,
    /// Calculadora de métricas para generar reportes
    metrics_calculator: MetricsCalculator,
}

/// Resultado completo de una ejecución.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    /// Algoritmo que se simuló
    pub algorithm: SchedulingAlgorithm,
    /// Procesos en su estado final, ordenados por `(arrival_time, id)`
    pub processes: Vec<Process>,
    /// Traza completa de eventos de CPU
    pub trace: ExecutionTrace,
    /// Instante en que terminó el último proceso
    pub makespan: u64,
    /// Cambios de contexto contados por el motor
    pub context_switches: usize,
}

impl Simulation {
    /// Crea una simulación con la carga controlada por defecto.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::{Simulation, SchedulingAlgorithm};
    ///
    /// let simulation = Simulation::new(SchedulingAlgorithm::fcfs());
    /// let metrics = simulation.run().unwrap();
    /// assert_eq!(metrics.processes.len(), 5);
    /// ```
    pub fn new(algorithm: SchedulingAlgorithm) -> Self {
        Self::with_processes(config::controlled_processes(), algorithm)
    }

    /// Crea una simulación con una carga de trabajo personalizada.
    ///
    /// # Arguments
    ///
    /// * `descriptors` - Procesos a simular, en cualquier orden
    /// * `algorithm` - Algoritmo de planificación a utilizar
    pub fn with_processes(descriptors: Vec<ProcessDescriptor>, algorithm: SchedulingAlgorithm) -> Self {
        Self {
            descriptors,
            algorithm,
            metrics_calculator: MetricsCalculator::new(),
        }
    }

    pub fn algorithm(&self) -> &SchedulingAlgorithm {
        &self.algorithm
    }

    pub fn descriptors(&self) -> &[ProcessDescriptor] {
        &self.descriptors
    }

    /// Ejecuta la simulación y devuelve procesos finales y traza.
    ///
    /// # Errors
    ///
    /// - `InvalidDescriptor` si algún descriptor es inválido (antes de empezar)
    /// - `PolicyConfiguration` si el algoritmo está mal configurado
    /// - `InvariantViolation` si la política toma una decisión imposible
    pub fn execute(&self) -> Result<SimulationOutcome> {
        let processes = prepare_processes(&self.descriptors)?;
        let policy = self.algorithm.build()?;

        log::info!(
            "[SIMULACION] Iniciando {} con {} procesos",
            self.algorithm,
            processes.len()
        );

        let engine = Engine::new(processes, policy);
        let (processes, trace, makespan, context_switches) = engine.run()?;

        log::info!(
            "[SIMULACION] {} completada en t={} ({} cambios de contexto)",
            self.algorithm,
            makespan,
            context_switches
        );

        Ok(SimulationOutcome {
            algorithm: self.algorithm.clone(),
            processes,
            trace,
            makespan,
            context_switches,
        })
    }

    /// Ejecuta la simulación y calcula sus métricas.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::{ProcessDescriptor, Simulation, SchedulingAlgorithm};
    ///
    /// let simulation = Simulation::with_processes(
    ///     vec![ProcessDescriptor::new(1, 0, 5, 0), ProcessDescriptor::new(2, 0, 3, 0)],
    ///     SchedulingAlgorithm::round_robin(2),
    /// );
    /// let metrics = simulation.run().unwrap();
    /// assert_eq!(metrics.makespan, 8);
    /// assert_eq!(metrics.context_switches, 4);
    /// ```
    pub fn run(&self) -> Result<SimulationMetrics> {
        let outcome = self.execute()?;
        Ok(self.metrics_calculator.calculate_simulation_metrics(&outcome))
    }

    /// Genera un reporte detallado de los resultados.
    pub fn generate_report(&self, metrics: &SimulationMetrics) -> String {
        self.metrics_calculator.generate_report(metrics)
    }

    /// Genera un reporte en formato CSV.
    pub fn generate_csv_report(&self, metrics: &SimulationMetrics) -> String {
        self.metrics_calculator.generate_csv_report(metrics)
    }
}

/// Porción de CPU en curso.
#[derive(Debug, Clone, Copy)]
struct Slice {
    index: usize,
    /// Instante en que termina la porción concedida
    end: u64,
    /// Último instante hasta el que se descontó tiempo ejecutado
    settled_at: u64,
}

/// Estado mutable de una ejecución. Se consume al terminar.
struct Engine {
    processes: Vec<Process>,
    policy: Box<dyn SchedulingPolicy>,
    trace: ExecutionTrace,
    now: u64,
    /// Índice del próximo proceso que aún no llegó
    next_arrival: usize,
    running: Option<Slice>,
    /// Último proceso que ocupó la CPU
    last_dispatched: Option<usize>,
    /// Proceso retirado en el último fin de porción cuyo `preempt` aún no se
    /// registró: si la política lo vuelve a elegir, la CPU nunca cambió de manos.
    pending_preempt: Option<usize>,
    completed: usize,
    context_switches: usize,
}

impl Engine {
    fn new(processes: Vec<Process>, policy: Box<dyn SchedulingPolicy>) -> Self {
        Self {
            processes,
            policy,
            trace: ExecutionTrace::new(),
            now: 0,
            next_arrival: 0,
            running: None,
            last_dispatched: None,
            pending_preempt: None,
            completed: 0,
            context_switches: 0,
        }
    }

    fn run(mut self) -> Result<(Vec<Process>, ExecutionTrace, u64, usize)> {
        loop {
            self.settle();
            let arrived = self.admit_arrivals();
            self.finish_slice_if_due();
            let boosted = self.boost_if_due();

            if self.completed == self.processes.len() {
                break;
            }

            self.decide(arrived, boosted)?;
            self.advance()?;
        }

        Ok((self.processes, self.trace, self.now, self.context_switches))
    }

    /// Descuenta del proceso en CPU el tiempo transcurrido desde el último evento.
    fn settle(&mut self) {
        if let Some(slice) = self.running.as_mut() {
            let elapsed = self.now - slice.settled_at;
            self.processes[slice.index].consume(elapsed);
            slice.settled_at = self.now;
        }
    }

    /// `Unarrived -> Ready` para todo proceso con `arrival_time <= now`.
    fn admit_arrivals(&mut self) -> usize {
        let mut arrived = 0;
        while let Some(process) = self.processes.get_mut(self.next_arrival) {
            if process.arrival_time > self.now {
                break;
            }
            process.mark_ready();
            log::debug!("[LLEGADA] t={} {}", self.now, process.name);
            self.policy.admit(self.next_arrival, &mut self.processes);
            self.next_arrival += 1;
            arrived += 1;
        }
        arrived
    }

    /// Cierra la porción en curso si llegó a su fin.
    fn finish_slice_if_due(&mut self) {
        let Some(slice) = self.running else {
            return;
        };
        if self.now < slice.end {
            return;
        }

        self.running = None;
        let process = &mut self.processes[slice.index];
        if process.remaining_time == 0 {
            process.mark_completed(self.now);
            self.trace.record(self.now, process.id, TraceEvent::Complete);
            self.completed += 1;
            log::debug!("[COMPLETADO] t={} {}", self.now, process.name);
        } else {
            process.mark_preempted();
            self.policy.on_preempt(slice.index, &mut self.processes);
            self.pending_preempt = Some(slice.index);
        }
    }

    fn boost_if_due(&mut self) -> bool {
        match self.policy.next_boost_at() {
            Some(at) if at <= self.now => {
                let running = self.running.map(|slice| slice.index);
                self.policy.boost(self.now, running, &mut self.processes);
                true
            }
            _ => false,
        }
    }

    fn decide(&mut self, arrived: usize, boosted: bool) -> Result<()> {
        match self.running {
            Some(slice) => {
                let arrival_point = arrived > 0 && self.policy.preempts_on_arrival();
                if arrival_point || boosted {
                    self.reconsider(slice)?;
                }
            }
            None => match self.policy.select_next(self.now, None, &self.processes) {
                Some(dispatch) if Some(dispatch.index) == self.pending_preempt => {
                    self.pending_preempt = None;
                    self.check_dispatch(dispatch, ProcessState::Ready)?;
                    self.processes[dispatch.index].mark_running(self.now);
                    self.running = Some(Slice {
                        index: dispatch.index,
                        end: self.now + dispatch.run_for,
                        settled_at: self.now,
                    });
                }
                Some(dispatch) => {
                    self.flush_pending_preempt();
                    self.start(dispatch)?;
                }
                None => self.flush_pending_preempt(),
            },
        }
        Ok(())
    }

    /// Punto de decisión a mitad de porción.
    fn reconsider(&mut self, slice: Slice) -> Result<()> {
        let slot = RunningSlot {
            index: slice.index,
            slice_left: slice.end - self.now,
        };
        let dispatch = self
            .policy
            .select_next(self.now, Some(slot), &self.processes)
            .ok_or_else(|| {
                SchedulerError::invariant(
                    self.now,
                    format!(
                        "{} dejó la CPU inactiva con un proceso en ejecución",
                        self.policy.name()
                    ),
                )
            })?;

        if dispatch.index == slice.index {
            self.check_dispatch(dispatch, ProcessState::Running)?;
            self.running = Some(Slice {
                end: self.now + dispatch.run_for,
                ..slice
            });
            return Ok(());
        }

        let process = &mut self.processes[slice.index];
        process.mark_preempted();
        self.trace.record(self.now, process.id, TraceEvent::Preempt);
        log::debug!(
            "[EXPROPIACION] t={} {} (restante {})",
            self.now,
            process.name,
            process.remaining_time
        );
        self.running = None;
        self.policy.on_preempt(slice.index, &mut self.processes);
        self.start(dispatch)
    }

    fn flush_pending_preempt(&mut self) {
        if let Some(index) = self.pending_preempt.take() {
            let process = &self.processes[index];
            self.trace.record(self.now, process.id, TraceEvent::Preempt);
            log::debug!(
                "[EXPROPIACION] t={} {} (restante {})",
                self.now,
                process.name,
                process.remaining_time
            );
        }
    }

    /// `Ready -> Running` con registro del despacho.
    fn start(&mut self, dispatch: Dispatch) -> Result<()> {
        self.check_dispatch(dispatch, ProcessState::Ready)?;

        if self.last_dispatched.is_some() {
            self.context_switches += 1;
        }
        self.last_dispatched = Some(dispatch.index);

        let process = &mut self.processes[dispatch.index];
        process.mark_running(self.now);
        self.trace.record(self.now, process.id, TraceEvent::Dispatch);
        log::debug!(
            "[DESPACHO] t={} {} por {} (restante {})",
            self.now,
            process.name,
            dispatch.run_for,
            process.remaining_time
        );

        self.running = Some(Slice {
            index: dispatch.index,
            end: self.now + dispatch.run_for,
            settled_at: self.now,
        });
        Ok(())
    }

    /// Verifica que la decisión de la política sea ejecutable.
    fn check_dispatch(&self, dispatch: Dispatch, expected: ProcessState) -> Result<()> {
        let process = self.processes.get(dispatch.index).ok_or_else(|| {
            SchedulerError::invariant(
                self.now,
                format!(
                    "{} eligió un índice inexistente ({})",
                    self.policy.name(),
                    dispatch.index
                ),
            )
        })?;

        if process.state != expected {
            return Err(SchedulerError::invariant(
                self.now,
                format!(
                    "{} eligió a {} en estado '{}' (se esperaba '{}')",
                    self.policy.name(),
                    process.name,
                    process.state,
                    expected
                ),
            ));
        }
        if dispatch.run_for == 0 || dispatch.run_for > process.remaining_time {
            return Err(SchedulerError::invariant(
                self.now,
                format!(
                    "{} concedió {} unidades a {} con {} restantes",
                    self.policy.name(),
                    dispatch.run_for,
                    process.name,
                    process.remaining_time
                ),
            ));
        }
        Ok(())
    }

    /// Avanza el reloj hasta el próximo evento relevante.
    fn advance(&mut self) -> Result<()> {
        let next_arrival = self
            .processes
            .get(self.next_arrival)
            .map(|process| process.arrival_time);

        match self.running {
            Some(slice) => {
                let mut next = slice.end;
                if let Some(arrival) = next_arrival {
                    next = next.min(arrival);
                }
                if let Some(boost) = self.policy.next_boost_at() {
                    if boost > self.now {
                        next = next.min(boost);
                    }
                }
                self.now = next;
            }
            None => match next_arrival {
                Some(arrival) => {
                    log::debug!("[INACTIVO] CPU libre de t={} a t={}", self.now, arrival);
                    self.now = arrival;
                }
                None => {
                    return Err(SchedulerError::invariant(
                        self.now,
                        format!(
                            "{} no eligió ningún proceso y quedan {} sin terminar",
                            self.policy.name(),
                            self.processes.len() - self.completed
                        ),
                    ));
                }
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors(specs: &[(u32, i64, i64, i32)]) -> Vec<ProcessDescriptor> {
        specs
            .iter()
            .map(|&(id, arrival, burst, priority)| ProcessDescriptor::new(id, arrival, burst, priority))
            .collect()
    }

    /// Política defectuosa que siempre elige el índice 0, esté listo o no.
    struct AlwaysFirst;

    impl SchedulingPolicy for AlwaysFirst {
        fn name(&self) -> &'static str {
            "always-first"
        }
        fn admit(&mut self, _index: usize, _processes: &mut [Process]) {}
        fn select_next(
            &mut self,
            _now: u64,
            _running: Option<RunningSlot>,
            processes: &[Process],
        ) -> Option<Dispatch> {
            Some(Dispatch::new(0, processes[0].burst_time))
        }
        fn on_preempt(&mut self, _index: usize, _processes: &mut [Process]) {}
    }

    /// Política defectuosa que concede más tiempo del que queda.
    struct Greedy(Vec<usize>);

    impl SchedulingPolicy for Greedy {
        fn name(&self) -> &'static str {
            "greedy"
        }
        fn admit(&mut self, index: usize, _processes: &mut [Process]) {
            self.0.push(index);
        }
        fn select_next(
            &mut self,
            _now: u64,
            _running: Option<RunningSlot>,
            processes: &[Process],
        ) -> Option<Dispatch> {
            let index = self.0.pop()?;
            Some(Dispatch::new(index, processes[index].remaining_time + 1))
        }
        fn on_preempt(&mut self, index: usize, _processes: &mut [Process]) {
            self.0.push(index);
        }
    }

    #[test]
    fn test_policy_selecting_completed_process_is_fatal() {
        let processes = prepare_processes(&descriptors(&[(1, 0, 2, 0), (2, 0, 2, 0)])).unwrap();
        let result = Engine::new(processes, Box::new(AlwaysFirst)).run();

        assert!(matches!(
            result,
            Err(SchedulerError::InvariantViolation { time: 2, .. })
        ));
    }

    #[test]
    fn test_policy_overrunning_burst_is_fatal() {
        let processes = prepare_processes(&descriptors(&[(1, 0, 2, 0)])).unwrap();
        let result = Engine::new(processes, Box::new(Greedy(Vec::new()))).run();

        assert!(matches!(
            result,
            Err(SchedulerError::InvariantViolation { time: 0, .. })
        ));
    }

    #[test]
    fn test_idle_gap_before_first_arrival() {
        let simulation = Simulation::with_processes(
            descriptors(&[(1, 3, 2, 0), (2, 10, 1, 0)]),
            SchedulingAlgorithm::fcfs(),
        );
        let outcome = simulation.execute().unwrap();

        assert_eq!(outcome.makespan, 11);
        assert_eq!(outcome.processes[0].start_time, Some(3));
        assert_eq!(outcome.processes[1].start_time, Some(10));
        assert_eq!(outcome.trace.busy_time(), 3);
        assert_eq!(outcome.context_switches, 1);
    }

    #[test]
    fn test_single_process_round_robin_has_no_switches() {
        let simulation = Simulation::with_processes(
            descriptors(&[(1, 0, 7, 0)]),
            SchedulingAlgorithm::round_robin(2),
        );
        let outcome = simulation.execute().unwrap();

        // Re-elegir al mismo proceso no cambia la CPU de manos
        assert_eq!(outcome.trace.len(), 2);
        assert_eq!(outcome.context_switches, 0);
        assert_eq!(outcome.makespan, 7);
    }

    #[test]
    fn test_invalid_descriptor_fails_before_running() {
        let simulation = Simulation::with_processes(
            descriptors(&[(1, 0, 3, 0), (2, 1, 0, 0)]),
            SchedulingAlgorithm::fcfs(),
        );
        assert!(matches!(
            simulation.execute(),
            Err(SchedulerError::InvalidDescriptor { process_id: Some(2), .. })
        ));
    }

    #[test]
    fn test_bursts_beyond_clock_range_are_rejected() {
        let simulation = Simulation::with_processes(
            descriptors(&[(1, 0, i64::MAX, 0), (2, 0, i64::MAX, 0), (3, 0, i64::MAX, 0)]),
            SchedulingAlgorithm::fcfs(),
        );
        assert!(matches!(
            simulation.execute(),
            Err(SchedulerError::InvalidDescriptor { process_id: None, .. })
        ));
    }

    #[test]
    fn test_run_ending_at_clock_limit() {
        let simulation = Simulation::with_processes(
            descriptors(&[(1, i64::MAX, i64::MAX, 0), (2, 0, 1, 0)]),
            SchedulingAlgorithm::srtf(),
        );
        let outcome = simulation.execute().unwrap();

        assert_eq!(outcome.makespan, u64::MAX - 1);
        assert_eq!(outcome.trace.completion_order(), vec![2, 1]);
    }

    #[test]
    fn test_invalid_policy_fails_before_running() {
        let simulation = Simulation::new(SchedulingAlgorithm::round_robin(0));
        assert!(matches!(
            simulation.execute(),
            Err(SchedulerError::PolicyConfiguration(_))
        ));
    }
}
