//! # Simulador de Planificación de CPU
//!
//! Esta biblioteca implementa un simulador de eventos discretos para
//! algoritmos de planificación de procesos sobre una única CPU lógica. A
//! partir de una carga de trabajo declarada (llegada, ráfaga y prioridad de
//! cada proceso) produce una traza de ejecución y métricas de rendimiento.
//!
//! ## Características principales
//!
//! - **Políticas intercambiables**: FCFS, Round Robin, Round Robin con
//!   prioridades, SJN, SRTF y MLFQ, todas detrás del trait
//!   [`SchedulingPolicy`].
//! - **Motor determinista**: el tiempo salta de evento en evento (llegadas,
//!   fin de quantum, boosts) y cada decisión de la política se valida.
//! - **Métricas detalladas**: turnaround, espera, respuesta, throughput,
//!   utilización de CPU y cambios de contexto, con reportes en texto, CSV
//!   y línea de tiempo.
//! - **Comparación**: un benchmark ejecuta varios algoritmos sobre la misma
//!   carga en hilos independientes.
//!
//! ## Estructura del proyecto
//!
//! - `process`: descriptores de entrada y procesos en ejecución
//! - `trace`: traza de eventos de CPU
//! - `policies`: el contrato de política y sus seis implementaciones
//! - `scheduler`: selección y configuración de algoritmos
//! - `simulation`: el motor de simulación
//! - `metrics`: cálculo de métricas y reportes
//! - `workload`: cargas de trabajo predefinidas y aleatorias
//! - `benchmark`: comparación entre algoritmos

pub mod benchmark;
pub mod error;
pub mod metrics;
pub mod policies;
pub mod process;
pub mod scheduler;
pub mod simulation;
pub mod trace;
pub mod workload;

// Re-exportar las estructuras principales para facilitar su uso
pub use benchmark::{Benchmark, BenchmarkEntry, BenchmarkRun};
pub use error::{Result, SchedulerError};
pub use metrics::{MetricsCalculator, ProcessMetrics, SimulationMetrics};
pub use policies::{Dispatch, RunningSlot, SchedulingPolicy};
pub use process::{Process, ProcessDescriptor, ProcessState};
pub use scheduler::{AlgorithmKind, MlfqConfig, PolicySettings, SchedulingAlgorithm};
pub use simulation::{Simulation, SimulationOutcome};
pub use trace::{ExecutionTrace, Segment, TraceEntry, TraceEvent};
pub use workload::{RandomWorkload, Workload};

/// Configuración por defecto del simulador
pub mod config {
    use crate::process::ProcessDescriptor;

    /// Quantum por defecto para Round Robin y Round Robin con prioridades
    pub const DEFAULT_QUANTUM: u64 = 2;

    /// Número de colas de MLFQ
    pub const DEFAULT_MLFQ_LEVELS: usize = 3;

    /// Quantum del nivel 0 de MLFQ; cada nivel duplica el anterior
    pub const DEFAULT_MLFQ_BASE_QUANTUM: u64 = 2;

    /// Intervalo entre boosts de MLFQ
    pub const DEFAULT_BOOST_INTERVAL: u64 = 50;

    /// Procesos de la carga aleatoria
    pub const DEFAULT_RANDOM_PROCESSES: usize = 5;

    /// Semilla de la carga aleatoria
    pub const DEFAULT_SEED: u64 = 42;

    /// Carga controlada de demostración: cinco procesos con llegadas
    /// escalonadas y prioridades mezcladas.
    pub fn controlled_processes() -> Vec<ProcessDescriptor> {
        vec![
            ProcessDescriptor::new(1, 0, 10, 3),
            ProcessDescriptor::new(2, 2, 6, 5),
            ProcessDescriptor::new(3, 4, 12, 1),
            ProcessDescriptor::new(4, 6, 4, 4),
            ProcessDescriptor::new(5, 8, 8, 2),
        ]
    }
}
