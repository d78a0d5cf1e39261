//! # Módulo de Métricas y Reportes
//!
//! Este módulo se encarga de calcular las métricas de rendimiento de una
//! simulación terminada y de generar reportes en texto, CSV y línea de
//! tiempo. Todo es una función pura de los procesos finales y la traza.

use std::borrow::Cow;

use serde::Serialize;

use crate::process::Process;
use crate::simulation::SimulationOutcome;
use crate::trace::{ExecutionTrace, TraceEvent};

/// Métricas individuales de un proceso en la simulación.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessMetrics {
    /// ID del proceso
    pub process_id: u32,
    /// Nombre del proceso
    pub name: String,
    pub arrival_time: u64,
    pub burst_time: u64,
    pub priority: i32,
    /// Primer despacho
    pub start_time: u64,
    pub completion_time: u64,
    /// `completion - arrival`
    pub turnaround_time: u64,
    /// `turnaround - burst`
    pub waiting_time: u64,
    /// `start - arrival`
    pub response_time: u64,
    /// Veces que el proceso perdió la CPU sin terminar
    pub preemptions: usize,
}

/// Métricas agregadas de toda la simulación.
///
/// Contiene estadísticas resumidas del rendimiento de un algoritmo sobre
/// una carga de trabajo completa.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationMetrics {
    /// Nombre del algoritmo con sus parámetros
    pub algorithm: String,
    /// Métricas individuales de cada proceso, ordenadas por id
    pub processes: Vec<ProcessMetrics>,
    pub average_turnaround_time: f64,
    pub average_waiting_time: f64,
    pub average_response_time: f64,
    /// Instante en que terminó el último proceso (medido desde t=0)
    pub makespan: u64,
    /// Tiempo total con la CPU ocupada
    pub busy_time: u64,
    /// Procesos terminados por unidad de tiempo
    pub throughput: f64,
    /// Fracción del makespan con la CPU ocupada, entre 0 y 1
    pub cpu_utilization: f64,
    pub context_switches: usize,
    /// Ids en el orden en que terminaron
    pub completion_order: Vec<u32>,
}

/// Calculadora de métricas para la simulación.
///
/// Proporciona métodos para calcular métricas individuales y agregadas,
/// así como para generar reportes formateados de los resultados.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Crea una nueva instancia del calculador de métricas.
    pub fn new() -> Self {
        Self
    }

    /// Calcula las métricas para un proceso individual.
    ///
    /// # Arguments
    ///
    /// * `process` - Proceso en su estado final
    /// * `trace` - Traza de la ejecución
    ///
    /// # Returns
    ///
    /// `ProcessMetrics` con todas las métricas calculadas, o `None` si
    /// el proceso no ha sido completado
    pub fn calculate_process_metrics(
        &self,
        process: &Process,
        trace: &ExecutionTrace,
    ) -> Option<ProcessMetrics> {
        if !process.is_completed() {
            return None;
        }

        let start_time = process.start_time?;
        let completion_time = process.completion_time?;
        let turnaround_time = completion_time - process.arrival_time;
        debug_assert!(
            turnaround_time >= process.burst_time,
            "{} terminó antes de ejecutar toda su ráfaga",
            process.name
        );

        Some(ProcessMetrics {
            process_id: process.id,
            name: process.name.clone(),
            arrival_time: process.arrival_time,
            burst_time: process.burst_time,
            priority: process.priority,
            start_time,
            completion_time,
            turnaround_time,
            waiting_time: turnaround_time - process.burst_time,
            response_time: start_time - process.arrival_time,
            preemptions: trace.count_for(process.id, TraceEvent::Preempt),
        })
    }

    /// Calcula las métricas agregadas de toda la simulación.
    ///
    /// Los promedios son medias aritméticas simples sobre los procesos
    /// completados. Con makespan 0 el throughput y la utilización son 0.
    pub fn calculate_simulation_metrics(&self, outcome: &SimulationOutcome) -> SimulationMetrics {
        let mut processes: Vec<ProcessMetrics> = outcome
            .processes
            .iter()
            .filter_map(|process| self.calculate_process_metrics(process, &outcome.trace))
            .collect();
        processes.sort_by_key(|metrics| metrics.process_id);

        let average = |value: fn(&ProcessMetrics) -> u64| -> f64 {
            if processes.is_empty() {
                0.0
            } else {
                processes.iter().map(|m| value(m) as f64).sum::<f64>() / processes.len() as f64
            }
        };
        let average_turnaround_time = average(|m| m.turnaround_time);
        let average_waiting_time = average(|m| m.waiting_time);
        let average_response_time = average(|m| m.response_time);

        let busy_time = outcome.trace.busy_time();
        let (throughput, cpu_utilization) = if outcome.makespan > 0 {
            let makespan = outcome.makespan as f64;
            (processes.len() as f64 / makespan, busy_time as f64 / makespan)
        } else {
            (0.0, 0.0)
        };

        SimulationMetrics {
            algorithm: outcome.algorithm.to_string(),
            processes,
            average_turnaround_time,
            average_waiting_time,
            average_response_time,
            makespan: outcome.makespan,
            busy_time,
            throughput,
            cpu_utilization,
            context_switches: outcome.trace.context_switches(),
            completion_order: outcome.trace.completion_order(),
        }
    }

    /// Genera un reporte detallado de los resultados de la simulación.
    ///
    /// # Arguments
    ///
    /// * `metrics` - Métricas de la simulación
    ///
    /// # Returns
    ///
    /// String con el reporte formateado
    pub fn generate_report(&self, metrics: &SimulationMetrics) -> String {
        let mut report = String::new();

        report.push_str(&format!(
            "\n=== REPORTE DE RESULTADOS: {} ===\n\n",
            metrics.algorithm
        ));

        // Encabezado de la tabla
        report.push_str(&format!(
            "{:^8} {:^9} {:^7} {:^6} {:^8} {:^6} {:^8} {:^11} {:^7} {:^9} {:^6}\n",
            "Proc", "Nombre", "Llegada", "Ráfaga", "Prioridad", "Inicio", "Fin", "Turnaround",
            "Espera", "Respuesta", "Exprop"
        ));
        report.push_str(&format!("{}\n", "-".repeat(100)));

        for process in &metrics.processes {
            report.push_str(&format!(
                "{:^8} {:^9} {:^7} {:^6} {:^8} {:^6} {:^8} {:^11} {:^7} {:^9} {:^6}\n",
                format!("#{:02}", process.process_id),
                process.name,
                process.arrival_time,
                process.burst_time,
                process.priority,
                process.start_time,
                process.completion_time,
                process.turnaround_time,
                process.waiting_time,
                process.response_time,
                process.preemptions,
            ));
        }

        // Estadísticas resumidas
        report.push_str("\n=== ESTADÍSTICAS RESUMIDAS ===\n");
        report.push_str(&format!(
            "Procesos completados: {}\n",
            metrics.processes.len()
        ));
        report.push_str(&format!(
            "Turnaround promedio: {:.2}\n",
            metrics.average_turnaround_time
        ));
        report.push_str(&format!(
            "Tiempo de espera promedio: {:.2}\n",
            metrics.average_waiting_time
        ));
        report.push_str(&format!(
            "Tiempo de respuesta promedio: {:.2}\n",
            metrics.average_response_time
        ));
        report.push_str(&format!("Makespan: {}\n", metrics.makespan));
        report.push_str(&format!(
            "Throughput: {:.3} procesos/unidad\n",
            metrics.throughput
        ));
        report.push_str(&format!(
            "Utilización de CPU: {}\n",
            Self::format_percentage(metrics.cpu_utilization)
        ));
        report.push_str(&format!(
            "Cambios de contexto: {}\n",
            metrics.context_switches
        ));
        report.push_str(&format!(
            "Orden de finalización: {:?}\n",
            metrics.completion_order
        ));

        report
    }

    /// Genera un reporte en formato CSV, una línea por proceso.
    pub fn generate_csv_report(&self, metrics: &SimulationMetrics) -> String {
        let mut csv = String::new();

        csv.push_str("ProcessID,Name,Arrival,Burst,Priority,Start,Completion,Turnaround,Waiting,Response,Preemptions\n");

        for process in &metrics.processes {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{}\n",
                process.process_id,
                Self::csv_field(&process.name),
                process.arrival_time,
                process.burst_time,
                process.priority,
                process.start_time,
                process.completion_time,
                process.turnaround_time,
                process.waiting_time,
                process.response_time,
                process.preemptions,
            ));
        }

        csv
    }

    /// Genera la línea de tiempo (diagrama de Gantt en texto) de una ejecución.
    ///
    /// Cada línea es un intervalo de ocupación de la CPU; los huecos sin
    /// proceso aparecen como `inactivo`.
    pub fn generate_timeline(&self, outcome: &SimulationOutcome) -> String {
        let mut timeline = String::new();
        timeline.push_str(&format!("\n=== LÍNEA DE TIEMPO: {} ===\n", outcome.algorithm));

        let name_of = |process_id: u32| {
            outcome
                .processes
                .iter()
                .find(|p| p.id == process_id)
                .map_or_else(|| format!("P{}", process_id), |p| p.name.clone())
        };

        let mut cursor = 0;
        for segment in outcome.trace.segments() {
            if segment.start > cursor {
                timeline.push_str(&format!("[{:>5} - {:>5}] inactivo\n", cursor, segment.start));
            }
            timeline.push_str(&format!(
                "[{:>5} - {:>5}] {} ({})\n",
                segment.start,
                segment.end,
                name_of(segment.process_id),
                segment.duration()
            ));
            cursor = segment.end;
        }

        timeline
    }

    /// Entrecomilla un campo CSV si contiene comas, comillas o saltos de línea.
    fn csv_field(value: &str) -> Cow<'_, str> {
        if value.contains([',', '"', '\n', '\r']) {
            Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
        } else {
            Cow::Borrowed(value)
        }
    }

    /// Formatea una fracción como porcentaje con dos decimales.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::MetricsCalculator;
    ///
    /// assert_eq!(MetricsCalculator::format_percentage(0.875), "87.50%");
    /// ```
    pub fn format_percentage(ratio: f64) -> String {
        format!("{:.2}%", ratio * 100.0)
    }
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessDescriptor;
    use crate::scheduler::SchedulingAlgorithm;
    use crate::simulation::Simulation;

    fn fcfs_controlled() -> SimulationOutcome {
        Simulation::new(SchedulingAlgorithm::fcfs()).execute().unwrap()
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(MetricsCalculator::format_percentage(1.0), "100.00%");
        assert_eq!(MetricsCalculator::format_percentage(0.0), "0.00%");
        assert_eq!(MetricsCalculator::format_percentage(0.3333), "33.33%");
    }

    #[test]
    fn test_fcfs_controlled_metrics() {
        let calculator = MetricsCalculator::new();
        let metrics = calculator.calculate_simulation_metrics(&fcfs_controlled());

        // 0-10, 10-16, 16-28, 28-32, 32-40
        let turnarounds: Vec<u64> = metrics.processes.iter().map(|m| m.turnaround_time).collect();
        assert_eq!(turnarounds, vec![10, 14, 24, 26, 32]);
        assert!((metrics.average_turnaround_time - 21.2).abs() < 1e-9);
        assert!((metrics.average_waiting_time - 13.2).abs() < 1e-9);
        assert!((metrics.average_response_time - 13.2).abs() < 1e-9);
        assert_eq!(metrics.makespan, 40);
        assert!((metrics.throughput - 0.125).abs() < 1e-9);
        assert!((metrics.cpu_utilization - 1.0).abs() < 1e-9);
        assert_eq!(metrics.context_switches, 4);
        assert_eq!(metrics.completion_order, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_incomplete_process_has_no_metrics() {
        let process = Process::from_descriptor(&ProcessDescriptor::new(1, 0, 3, 0)).unwrap();
        let calculator = MetricsCalculator::default();
        assert!(calculator
            .calculate_process_metrics(&process, &ExecutionTrace::new())
            .is_none());
    }

    #[test]
    fn test_csv_quotes_names_with_separators() {
        let outcome = Simulation::with_processes(
            vec![
                ProcessDescriptor::new(1, 0, 2, 0).with_name("compilar, enlazar"),
                ProcessDescriptor::new(2, 0, 1, 0).with_name("dice \"hola\""),
            ],
            SchedulingAlgorithm::fcfs(),
        )
        .execute()
        .unwrap();
        let calculator = MetricsCalculator::new();
        let csv = calculator.generate_csv_report(&calculator.calculate_simulation_metrics(&outcome));

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "1,\"compilar, enlazar\",0,2,0,0,2,2,0,0,0");
        assert_eq!(lines[2], "2,\"dice \"\"hola\"\"\",0,1,0,2,3,3,2,2,0");
        assert_eq!(MetricsCalculator::csv_field("P1"), "P1");
    }

    #[test]
    #[should_panic(expected = "terminó antes de ejecutar toda su ráfaga")]
    fn test_inconsistent_completion_is_not_hidden() {
        let mut process = Process::from_descriptor(&ProcessDescriptor::new(1, 0, 5, 0)).unwrap();
        process.mark_ready();
        process.mark_running(0);
        process.consume(5);
        // Completado en t=3 con una ráfaga de 5
        process.mark_completed(3);

        MetricsCalculator::new().calculate_process_metrics(&process, &ExecutionTrace::new());
    }

    #[test]
    fn test_averages_of_huge_times_do_not_overflow() {
        let outcome = Simulation::with_processes(
            vec![
                ProcessDescriptor::new(1, 0, i64::MAX, 0),
                ProcessDescriptor::new(2, 0, i64::MAX, 0),
            ],
            SchedulingAlgorithm::fcfs(),
        )
        .execute()
        .unwrap();
        let metrics = MetricsCalculator::new().calculate_simulation_metrics(&outcome);

        // Turnarounds MAX y 2*MAX: la suma no cabe en u64
        let expected = 1.5 * i64::MAX as f64;
        assert!((metrics.average_turnaround_time - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn test_utilization_counts_idle_gap() {
        let outcome = Simulation::with_processes(
            vec![ProcessDescriptor::new(1, 4, 4, 0)],
            SchedulingAlgorithm::fcfs(),
        )
        .execute()
        .unwrap();
        let metrics = MetricsCalculator::new().calculate_simulation_metrics(&outcome);

        assert_eq!(metrics.busy_time, 4);
        assert!((metrics.cpu_utilization - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_reports_contain_every_process() {
        let calculator = MetricsCalculator::new();
        let outcome = fcfs_controlled();
        let metrics = calculator.calculate_simulation_metrics(&outcome);

        let report = calculator.generate_report(&metrics);
        assert!(report.contains("=== ESTADÍSTICAS RESUMIDAS ==="));
        assert!(report.contains("Cambios de contexto: 4"));

        let csv = calculator.generate_csv_report(&metrics);
        assert_eq!(csv.lines().count(), 6);
        assert!(csv.lines().nth(1).unwrap().starts_with("1,P1,0,10,3,0,10,10,0,0,0"));

        let timeline = calculator.generate_timeline(&outcome);
        assert!(timeline.contains("[    0 -    10] P1 (10)"));
        assert!(!timeline.contains("inactivo"));
    }
}
