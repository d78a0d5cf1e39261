//! Ejemplo básico de uso del simulador de planificación de CPU

use cpu_scheduling_simulator::{
    Benchmark, MetricsCalculator, PolicySettings, SchedulingAlgorithm, Simulation, Workload,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Ejemplo: Uso Básico del Simulador ===\n");

    // Ejecutar simulación con FCFS
    println!("1. Ejecutando simulación con FCFS...");
    let fcfs_simulation = Simulation::new(SchedulingAlgorithm::fcfs());
    let fcfs_metrics = fcfs_simulation.run()?;
    println!("{}", fcfs_simulation.generate_report(&fcfs_metrics));

    // Ejecutar simulación con Round Robin y mostrar la línea de tiempo
    println!("\n2. Ejecutando simulación con Round Robin (quantum 2)...");
    let rr_simulation = Simulation::new(SchedulingAlgorithm::round_robin(2));
    let rr_outcome = rr_simulation.execute()?;
    let calculator = MetricsCalculator::new();
    let rr_metrics = calculator.calculate_simulation_metrics(&rr_outcome);
    println!("{}", rr_simulation.generate_report(&rr_metrics));
    println!("{}", calculator.generate_timeline(&rr_outcome));

    // Comparación de resultados
    println!("\n=== Comparación FCFS vs Round Robin ===");
    println!("| Métrica                | FCFS      | Round Robin |");
    println!("|------------------------|-----------|-------------|");
    println!(
        "| Turnaround promedio    | {:>9.2} | {:>11.2} |",
        fcfs_metrics.average_turnaround_time, rr_metrics.average_turnaround_time
    );
    println!(
        "| Espera promedio        | {:>9.2} | {:>11.2} |",
        fcfs_metrics.average_waiting_time, rr_metrics.average_waiting_time
    );
    println!(
        "| Respuesta promedio     | {:>9.2} | {:>11.2} |",
        fcfs_metrics.average_response_time, rr_metrics.average_response_time
    );
    println!(
        "| Cambios de contexto    | {:>9} | {:>11} |",
        fcfs_metrics.context_switches, rr_metrics.context_switches
    );

    // Todos los algoritmos sobre una carga mixta
    println!("\n3. Comparando todos los algoritmos sobre la carga mixta...");
    let algorithms = Benchmark::configure_all(&PolicySettings::default())?;
    let benchmark = Benchmark::new(Workload::Mixed, algorithms);
    let entries = benchmark.run();
    println!("{}", benchmark.comparison_report(&entries));

    Ok(())
}
