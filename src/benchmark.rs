//! # Módulo de Comparación de Algoritmos
//!
//! Ejecuta varios algoritmos sobre la misma carga de trabajo. Cada
//! algoritmo corre en su propio hilo con su propia `Simulation`; los hilos
//! no comparten procesos, política ni traza.

use std::thread;

use crate::error::{Result, SchedulerError};
use crate::metrics::{MetricsCalculator, SimulationMetrics};
use crate::process::ProcessDescriptor;
use crate::scheduler::{AlgorithmKind, PolicySettings, SchedulingAlgorithm};
use crate::simulation::{Simulation, SimulationOutcome};
use crate::workload::Workload;

/// Ejecución terminada: traza y procesos finales junto con sus métricas.
#[derive(Debug, Clone)]
pub struct BenchmarkRun {
    pub outcome: SimulationOutcome,
    pub metrics: SimulationMetrics,
}

/// Resultado de un algoritmo dentro de una comparación.
#[derive(Debug, Clone)]
pub struct BenchmarkEntry {
    pub algorithm: SchedulingAlgorithm,
    /// La ejecución, o el error que la abortó
    pub result: Result<BenchmarkRun>,
}

impl BenchmarkEntry {
    /// Métricas de la ejecución, si terminó.
    pub fn metrics(&self) -> Option<&SimulationMetrics> {
        self.result.as_ref().ok().map(|run| &run.metrics)
    }
}

/// Comparación de algoritmos sobre una carga.
pub struct Benchmark {
    label: String,
    descriptors: Vec<ProcessDescriptor>,
    algorithms: Vec<SchedulingAlgorithm>,
}

impl Benchmark {
    /// Compara `algorithms` sobre una carga predefinida.
    pub fn new(workload: Workload, algorithms: Vec<SchedulingAlgorithm>) -> Self {
        Self::with_processes(workload.as_str(), workload.processes(), algorithms)
    }

    /// Compara `algorithms` sobre una carga arbitraria.
    pub fn with_processes(
        label: impl Into<String>,
        descriptors: Vec<ProcessDescriptor>,
        algorithms: Vec<SchedulingAlgorithm>,
    ) -> Self {
        Self {
            label: label.into(),
            descriptors,
            algorithms,
        }
    }

    /// Configura los seis algoritmos con los mismos parámetros.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::{Benchmark, PolicySettings, Workload};
    ///
    /// let algorithms = Benchmark::configure_all(&PolicySettings::default()).unwrap();
    /// let entries = Benchmark::new(Workload::Mixed, algorithms).run();
    /// assert_eq!(entries.len(), 6);
    /// assert!(entries.iter().all(|entry| entry.result.is_ok()));
    /// ```
    pub fn configure_all(settings: &PolicySettings) -> Result<Vec<SchedulingAlgorithm>> {
        AlgorithmKind::ALL
            .iter()
            .map(|kind| kind.configure(settings))
            .collect()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Ejecuta todos los algoritmos y devuelve un resultado por algoritmo,
    /// en el mismo orden en que se configuraron.
    ///
    /// El fallo de un algoritmo no afecta a los demás.
    pub fn run(&self) -> Vec<BenchmarkEntry> {
        log::info!(
            "[BENCHMARK] Carga '{}': {} algoritmos, {} procesos",
            self.label,
            self.algorithms.len(),
            self.descriptors.len()
        );

        thread::scope(|scope| {
            let handles: Vec<_> = self
                .algorithms
                .iter()
                .map(|algorithm| {
                    let simulation =
                        Simulation::with_processes(self.descriptors.clone(), algorithm.clone());
                    let handle = scope.spawn(move || -> Result<BenchmarkRun> {
                        let outcome = simulation.execute()?;
                        let metrics =
                            MetricsCalculator::new().calculate_simulation_metrics(&outcome);
                        Ok(BenchmarkRun { outcome, metrics })
                    });
                    (algorithm, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(algorithm, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(SchedulerError::invariant(
                            0,
                            format!("la simulación de {} terminó abruptamente", algorithm),
                        ))
                    });
                    if let Err(error) = &result {
                        log::error!("[BENCHMARK] {} falló: {}", algorithm, error);
                    }
                    BenchmarkEntry {
                        algorithm: algorithm.clone(),
                        result,
                    }
                })
                .collect()
        })
    }

    /// Algoritmo con menor turnaround promedio entre los que terminaron.
    pub fn best_turnaround(entries: &[BenchmarkEntry]) -> Option<&BenchmarkEntry> {
        entries
            .iter()
            .filter_map(|entry| entry.metrics().map(|metrics| (entry, metrics)))
            .min_by(|(_, a), (_, b)| {
                a.average_turnaround_time
                    .total_cmp(&b.average_turnaround_time)
            })
            .map(|(entry, _)| entry)
    }

    /// Genera la tabla comparativa de una ejecución.
    pub fn comparison_report(&self, entries: &[BenchmarkEntry]) -> String {
        let mut report = String::new();

        report.push_str(&format!(
            "\n=== COMPARACIÓN DE ALGORITMOS (carga: {}) ===\n\n",
            self.label
        ));
        report.push_str(&format!(
            "{:<28} {:>11} {:>9} {:>10} {:>11} {:>9} {:>9}\n",
            "Algoritmo", "Turnaround", "Espera", "Respuesta", "Throughput", "CPU", "Cambios"
        ));
        report.push_str(&format!("{}\n", "-".repeat(93)));

        for entry in entries {
            match &entry.result {
                Ok(BenchmarkRun { metrics, .. }) => report.push_str(&format!(
                    "{:<28} {:>11.2} {:>9.2} {:>10.2} {:>11.3} {:>9} {:>9}\n",
                    entry.algorithm.to_string(),
                    metrics.average_turnaround_time,
                    metrics.average_waiting_time,
                    metrics.average_response_time,
                    metrics.throughput,
                    MetricsCalculator::format_percentage(metrics.cpu_utilization),
                    metrics.context_switches,
                )),
                Err(error) => report.push_str(&format!(
                    "{:<28} ERROR: {}\n",
                    entry.algorithm.to_string(),
                    error
                )),
            }
        }

        if let Some(best) = Self::best_turnaround(entries) {
            report.push_str(&format!(
                "\nMejor turnaround promedio: {}\n",
                best.algorithm
            ));
        }

        report
    }
}
