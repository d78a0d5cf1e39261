//! Tests de integración para el simulador de planificación de CPU

use cpu_scheduling_simulator::{
    config, AlgorithmKind, Benchmark, MetricsCalculator, PolicySettings, ProcessDescriptor,
    RandomWorkload, SchedulerError, SchedulingAlgorithm, Simulation, SimulationOutcome,
    TraceEvent, Workload,
};

fn processes(specs: &[(u32, i64, i64, i32)]) -> Vec<ProcessDescriptor> {
    specs
        .iter()
        .map(|&(id, arrival, burst, priority)| ProcessDescriptor::new(id, arrival, burst, priority))
        .collect()
}

fn execute(specs: &[(u32, i64, i64, i32)], algorithm: SchedulingAlgorithm) -> SimulationOutcome {
    Simulation::with_processes(processes(specs), algorithm)
        .execute()
        .unwrap()
}

fn all_algorithms() -> Vec<SchedulingAlgorithm> {
    Benchmark::configure_all(&PolicySettings::default()).unwrap()
}

#[test]
fn test_fcfs_simulation_completes() {
    let simulation = Simulation::new(SchedulingAlgorithm::fcfs());
    let metrics = simulation.run().unwrap();

    // Verificar que todos los procesos fueron completados
    assert_eq!(metrics.processes.len(), 5);
    assert_eq!(metrics.completion_order.len(), 5);

    // En FCFS, el orden debe ser el mismo que el de llegada
    assert_eq!(metrics.completion_order, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_round_robin_simulation_completes() {
    let simulation = Simulation::new(SchedulingAlgorithm::round_robin(config::DEFAULT_QUANTUM));
    let metrics = simulation.run().unwrap();

    assert_eq!(metrics.processes.len(), 5);
    assert_eq!(metrics.completion_order.len(), 5);
    assert!(metrics.throughput > 0.0);
    assert!(metrics.context_switches > 4);
}

#[test]
fn test_every_run_satisfies_process_invariants() {
    for workload in Workload::ALL {
        for algorithm in all_algorithms() {
            let outcome = Simulation::with_processes(workload.processes(), algorithm.clone())
                .execute()
                .unwrap();

            for process in &outcome.processes {
                let start = process.start_time.unwrap();
                let completion = process.completion_time.unwrap();
                assert_eq!(process.remaining_time, 0, "{} / {}", workload, algorithm);
                assert!(start >= process.arrival_time, "{} / {}", workload, algorithm);
                assert!(
                    completion >= process.arrival_time + process.burst_time,
                    "{} / {}",
                    workload,
                    algorithm
                );
            }

            // Cada proceso ocupa la CPU exactamente su ráfaga
            for process in &outcome.processes {
                let executed: u64 = outcome
                    .trace
                    .segments()
                    .iter()
                    .filter(|segment| segment.process_id == process.id)
                    .map(|segment| segment.duration())
                    .sum();
                assert_eq!(executed, process.burst_time, "{} / {}", workload, algorithm);
            }
        }
    }
}

#[test]
fn test_metrics_consistency() {
    let calculator = MetricsCalculator::new();
    for workload in Workload::ALL {
        for algorithm in all_algorithms() {
            let outcome = Simulation::with_processes(workload.processes(), algorithm)
                .execute()
                .unwrap();
            let metrics = calculator.calculate_simulation_metrics(&outcome);

            for process in &metrics.processes {
                assert_eq!(
                    process.waiting_time + process.burst_time,
                    process.turnaround_time
                );
                assert!(process.response_time <= process.waiting_time);
            }

            let utilization_time = metrics.cpu_utilization * metrics.makespan as f64;
            assert!((utilization_time - metrics.busy_time as f64).abs() < 1e-6);
            assert_eq!(metrics.context_switches, outcome.context_switches);
            assert_eq!(
                metrics.context_switches,
                outcome.trace.count(TraceEvent::Dispatch) - 1
            );
        }
    }
}

#[test]
fn test_fcfs_starts_in_arrival_order() {
    let outcome = Simulation::with_processes(Workload::Mixed.processes(), SchedulingAlgorithm::fcfs())
        .execute()
        .unwrap();

    for p in &outcome.processes {
        for q in &outcome.processes {
            if p.arrival_time < q.arrival_time {
                assert!(p.start_time <= q.start_time);
            }
        }
    }
    assert_eq!(outcome.trace.count(TraceEvent::Preempt), 0);
}

#[test]
fn test_sjn_concrete_scenario() {
    let outcome = execute(&[(1, 0, 5, 0), (2, 1, 3, 0), (3, 2, 1, 0)], SchedulingAlgorithm::sjn());
    let metrics = MetricsCalculator::new().calculate_simulation_metrics(&outcome);

    assert_eq!(metrics.completion_order, vec![1, 3, 2]);
    let turnarounds: Vec<(u32, u64)> = metrics
        .processes
        .iter()
        .map(|m| (m.process_id, m.turnaround_time))
        .collect();
    assert_eq!(turnarounds, vec![(1, 5), (2, 8), (3, 4)]);
    assert_eq!(metrics.makespan, 9);
}

#[test]
fn test_round_robin_concrete_scenario() {
    let outcome = execute(&[(1, 0, 5, 0), (2, 0, 3, 0)], SchedulingAlgorithm::round_robin(2));

    assert_eq!(outcome.context_switches, 4);
    assert_eq!(outcome.makespan, 8);

    let dispatches: Vec<(u64, u32)> = outcome
        .trace
        .entries()
        .iter()
        .filter(|entry| entry.event == TraceEvent::Dispatch)
        .map(|entry| (entry.time, entry.process_id))
        .collect();
    assert_eq!(dispatches, vec![(0, 1), (2, 2), (4, 1), (6, 2), (7, 1)]);
}

#[test]
fn test_round_robin_preempts_exactly_at_quantum() {
    let quantum = 2;
    let outcome = execute(
        &[(1, 0, 5, 0), (2, 0, 7, 0), (3, 0, 3, 0)],
        SchedulingAlgorithm::round_robin(quantum),
    );

    let entries = outcome.trace.entries();
    for segment in outcome.trace.segments() {
        let closed_by_preempt = entries.iter().any(|entry| {
            entry.event == TraceEvent::Preempt
                && entry.process_id == segment.process_id
                && entry.time == segment.end
        });
        if closed_by_preempt {
            assert_eq!(segment.duration(), quantum);
        } else {
            assert!(segment.duration() >= 1);
        }
    }
    assert!(outcome.trace.count(TraceEvent::Preempt) > 0);
}

#[test]
fn test_round_robin_priority_serves_lowest_value_first() {
    let outcome = execute(
        &[(1, 0, 4, 2), (2, 0, 4, 1), (3, 1, 2, 1)],
        SchedulingAlgorithm::round_robin_priority(2),
    );

    // Prioridad 1 (procesos 2 y 3) en RR antes que el proceso 1
    assert_eq!(outcome.trace.completion_order(), vec![3, 2, 1]);
    let first = &outcome.processes[0];
    assert_eq!(first.id, 1);
    assert_eq!(first.start_time, Some(6));
}

#[test]
fn test_srtf_preempts_on_shorter_arrival() {
    let outcome = execute(&[(1, 0, 8, 0), (2, 1, 4, 0)], SchedulingAlgorithm::srtf());
    let entries = outcome.trace.entries();

    let preempt = entries
        .iter()
        .position(|entry| entry.event == TraceEvent::Preempt)
        .unwrap();
    assert_eq!(entries[preempt].process_id, 1);
    assert_eq!(entries[preempt].time, 1);
    assert_eq!(entries[preempt + 1].event, TraceEvent::Dispatch);
    assert_eq!(entries[preempt + 1].process_id, 2);
    assert_eq!(entries[preempt + 1].time, 1);

    assert_eq!(outcome.trace.completion_order(), vec![2, 1]);
    assert_eq!(outcome.makespan, 12);
}

#[test]
fn test_srtf_tie_does_not_preempt() {
    let outcome = execute(&[(1, 0, 5, 0), (2, 2, 3, 0)], SchedulingAlgorithm::srtf());

    assert_eq!(outcome.trace.count(TraceEvent::Preempt), 0);
    assert_eq!(outcome.trace.completion_order(), vec![1, 2]);
}

/// Un proceso largo seguido de un flujo continuo de procesos de una unidad.
fn starvation_workload() -> Vec<ProcessDescriptor> {
    let mut descriptors = vec![ProcessDescriptor::new(1, 0, 30, 0)];
    descriptors.extend((2..=60).map(|id| ProcessDescriptor::new(id, i64::from(id) - 1, 1, 0)));
    descriptors
}

fn second_dispatch_of_first(outcome: &SimulationOutcome) -> u64 {
    outcome
        .trace
        .entries()
        .iter()
        .filter(|entry| entry.event == TraceEvent::Dispatch && entry.process_id == 1)
        .nth(1)
        .map(|entry| entry.time)
        .unwrap()
}

#[test]
fn test_mlfq_boost_bounds_starvation() {
    let algorithm = SchedulingAlgorithm::mlfq(3, 2, 20).unwrap();
    let outcome = Simulation::with_processes(starvation_workload(), algorithm)
        .execute()
        .unwrap();

    let resumed = second_dispatch_of_first(&outcome);
    assert!((20..=22).contains(&resumed), "reanudado en t={}", resumed);
}

#[test]
fn test_mlfq_without_boost_starves_long_job() {
    let algorithm = SchedulingAlgorithm::mlfq(3, 2, 1_000).unwrap();
    let outcome = Simulation::with_processes(starvation_workload(), algorithm)
        .execute()
        .unwrap();

    assert!(second_dispatch_of_first(&outcome) >= 59);
}

#[test]
fn test_mlfq_demotes_long_job() {
    let outcome = execute(&[(1, 0, 20, 0), (2, 0, 20, 0)], SchedulingAlgorithm::mlfq(3, 2, 50).unwrap());

    let slices: Vec<u64> = outcome
        .trace
        .segments()
        .iter()
        .take(6)
        .map(|segment| segment.duration())
        .collect();
    assert_eq!(slices, vec![2, 2, 4, 4, 8, 8]);
    assert!(outcome.processes.iter().all(|p| p.mlfq_level == 2));
}

#[test]
fn test_invalid_descriptors_are_rejected() {
    let cases = [
        vec![],
        processes(&[(1, -1, 3, 0)]),
        processes(&[(1, 0, 0, 0)]),
        processes(&[(1, 0, 3, -2)]),
        processes(&[(1, 0, 3, 0), (1, 2, 3, 0)]),
    ];

    for descriptors in cases {
        let result = Simulation::with_processes(descriptors, SchedulingAlgorithm::fcfs()).run();
        assert!(matches!(
            result,
            Err(SchedulerError::InvalidDescriptor { .. })
        ));
    }
}

#[test]
fn test_algorithm_parameter_validation() {
    assert!("lottery".parse::<AlgorithmKind>().is_err());
    assert!(SchedulingAlgorithm::round_robin(0).validate().is_err());
    assert!(SchedulingAlgorithm::mlfq(0, 2, 50).is_err());
    assert!(SchedulingAlgorithm::mlfq(3, 2, 0).unwrap().build().is_err());

    let settings = PolicySettings {
        quantum: None,
        ..PolicySettings::default()
    };
    assert!(matches!(
        AlgorithmKind::RrPriority.configure(&settings),
        Err(SchedulerError::PolicyConfiguration(_))
    ));
    assert!(AlgorithmKind::Sjn.configure(&settings).is_ok());

    let settings = PolicySettings {
        mlfq_quanta: Some(vec![4, 4, 8]),
        ..PolicySettings::default()
    };
    assert!(AlgorithmKind::Mlfq.configure(&settings).is_err());
}

#[test]
fn test_descriptors_from_json() {
    let json = r#"[
        {"id": 1, "arrival_time": 0, "burst_time": 4, "priority": 2},
        {"id": 2, "name": "editor", "arrival_time": 1, "burst_time": 2}
    ]"#;
    let descriptors: Vec<ProcessDescriptor> = serde_json::from_str(json).unwrap();
    let outcome = Simulation::with_processes(descriptors, SchedulingAlgorithm::fcfs())
        .execute()
        .unwrap();

    assert_eq!(outcome.processes[1].name, "editor");
    assert_eq!(outcome.processes[1].priority, 0);
    assert_eq!(outcome.makespan, 6);
}

#[test]
fn test_report_generation() {
    let simulation = Simulation::new(SchedulingAlgorithm::srtf());
    let metrics = simulation.run().unwrap();

    let report = simulation.generate_report(&metrics);
    assert!(report.contains("=== REPORTE DE RESULTADOS: SRTF ==="));
    assert!(report.contains("Turnaround promedio"));

    let csv = simulation.generate_csv_report(&metrics);
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("ProcessID,"));
    assert_eq!(lines.count(), 5);

    let json = serde_json::to_string(&metrics).unwrap();
    assert!(json.contains("\"cpu_utilization\""));
}

#[test]
fn test_benchmark_compares_all_algorithms() {
    let benchmark = Benchmark::new(Workload::ArrivalBurst, all_algorithms());
    let entries = benchmark.run();
    let report = benchmark.comparison_report(&entries);

    assert_eq!(entries.len(), 6);
    for entry in &entries {
        assert!(report.contains(&entry.algorithm.to_string()));
    }
    // Todas las ejecuciones hacen el mismo trabajo total
    let busy: Vec<u64> = entries
        .iter()
        .map(|entry| entry.metrics().unwrap().busy_time)
        .collect();
    assert!(busy.iter().all(|&b| b == busy[0]));
}

#[test]
fn test_seeded_random_workload_runs_every_algorithm() {
    let generator = RandomWorkload::new(15, 2025);
    let descriptors = generator.processes().unwrap();
    let total_burst: u64 = descriptors.iter().map(|d| d.burst_time as u64).sum();

    let benchmark = Benchmark::with_processes(generator.label(), descriptors, all_algorithms());
    let first = benchmark.run();
    let second = benchmark.run();

    for (a, b) in first.iter().zip(&second) {
        let (a, b) = (a.metrics().unwrap(), b.metrics().unwrap());
        assert_eq!(a.busy_time, total_burst);
        assert_eq!(a.processes.len(), 15);
        assert_eq!(a, b);
    }
}
