use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use cpu_scheduling_simulator::{
    config, AlgorithmKind, Benchmark, BenchmarkRun, MetricsCalculator, PolicySettings,
    ProcessDescriptor, RandomWorkload, SchedulingAlgorithm, Workload,
};

/// Simulador de planificación de CPU.
///
/// Ejecuta uno o todos los algoritmos sobre una carga aleatoria con semilla,
/// una carga predefinida o una leída de un archivo JSON y muestra las
/// métricas de cada uno.
#[derive(Parser, Debug)]
#[command(name = "cpu-scheduling-simulator", version, about)]
struct Args {
    /// Algoritmo: all, fcfs, rr, rr_priority, sjn, srtf o mlfq
    #[arg(short, long, default_value = "all")]
    algorithm: String,

    /// Carga: random, controlled, io-bound, cpu-bound, mixed, arrival-burst o priority
    #[arg(short, long, default_value = "random")]
    workload: String,

    /// Número de procesos de la carga aleatoria
    #[arg(short, long, default_value_t = config::DEFAULT_RANDOM_PROCESSES)]
    processes: usize,

    /// Semilla de la carga aleatoria
    #[arg(short, long, default_value_t = config::DEFAULT_SEED)]
    seed: u64,

    /// Atajo para --workload controlled
    #[arg(long)]
    controlled: bool,

    /// Archivo JSON con un arreglo de procesos (reemplaza a --workload)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Quantum para rr y rr_priority
    #[arg(short, long, default_value_t = config::DEFAULT_QUANTUM)]
    quantum: u64,

    /// Número de niveles de MLFQ
    #[arg(long, default_value_t = config::DEFAULT_MLFQ_LEVELS)]
    mlfq_levels: usize,

    /// Quantum del nivel 0 de MLFQ
    #[arg(long, default_value_t = config::DEFAULT_MLFQ_BASE_QUANTUM)]
    mlfq_base_quantum: u64,

    /// Quanta explícitos por nivel, separados por comas
    #[arg(long, value_delimiter = ',')]
    mlfq_quanta: Option<Vec<u64>>,

    /// Intervalo entre boosts de MLFQ
    #[arg(long, default_value_t = config::DEFAULT_BOOST_INTERVAL)]
    boost_interval: u64,

    /// Mostrar la línea de tiempo de cada ejecución
    #[arg(long)]
    timeline: bool,

    /// Emitir las métricas por proceso en CSV
    #[arg(long)]
    csv: bool,

    /// Emitir métricas y traza en JSON
    #[arg(long)]
    json: bool,

    /// Directorio donde guardar los reportes en lugar de imprimirlos
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Logging detallado de cada evento
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn settings(&self) -> PolicySettings {
        PolicySettings {
            quantum: Some(self.quantum),
            mlfq_levels: self.mlfq_levels,
            mlfq_base_quantum: self.mlfq_base_quantum,
            mlfq_quanta: self.mlfq_quanta.clone(),
            boost_interval: self.boost_interval,
        }
    }

    fn algorithms(&self) -> Result<Vec<SchedulingAlgorithm>> {
        let settings = self.settings();
        if self.algorithm.eq_ignore_ascii_case("all") {
            return Ok(Benchmark::configure_all(&settings)?);
        }
        let kind: AlgorithmKind = self.algorithm.parse()?;
        Ok(vec![kind.configure(&settings)?])
    }

    /// Etiqueta y descriptores de la carga elegida.
    fn workload(&self) -> Result<(String, Vec<ProcessDescriptor>)> {
        match &self.input {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("No se pudo leer {}", path.display()))?;
                let descriptors: Vec<ProcessDescriptor> = serde_json::from_str(&content)
                    .with_context(|| format!("JSON inválido en {}", path.display()))?;
                Ok((path.display().to_string(), descriptors))
            }
            None if self.controlled => Ok((
                Workload::Controlled.as_str().to_string(),
                Workload::Controlled.processes(),
            )),
            None if self.workload.trim().eq_ignore_ascii_case("random") => {
                let generator = RandomWorkload::new(self.processes, self.seed);
                Ok((generator.label(), generator.processes()?))
            }
            None => {
                let workload: Workload = self.workload.parse()?;
                Ok((workload.as_str().to_string(), workload.processes()))
            }
        }
    }
}

fn init_logger(debug: bool) {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

/// Imprime `content` o lo guarda en `dir/file_name`.
fn emit(output_dir: Option<&Path>, file_name: &str, content: &str) -> Result<()> {
    match output_dir {
        Some(dir) => {
            let path = dir.join(file_name);
            fs::write(&path, content)
                .with_context(|| format!("No se pudo escribir {}", path.display()))?;
            log::info!("Reporte guardado en {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Emite los reportes de una ejecución terminada.
fn emit_run(
    args: &Args,
    algorithm: &SchedulingAlgorithm,
    run: &BenchmarkRun,
    calculator: &MetricsCalculator,
) -> Result<()> {
    let output_dir = args.output_dir.as_deref();
    let prefix = algorithm.kind().as_str();

    emit(
        output_dir,
        &format!("{}_report.txt", prefix),
        &calculator.generate_report(&run.metrics),
    )?;
    if args.timeline {
        emit(
            output_dir,
            &format!("{}_timeline.txt", prefix),
            &calculator.generate_timeline(&run.outcome),
        )?;
    }
    if args.csv {
        emit(
            output_dir,
            &format!("{}_metrics.csv", prefix),
            &calculator.generate_csv_report(&run.metrics),
        )?;
    }
    if args.json {
        let document = serde_json::json!({
            "metrics": run.metrics,
            "trace": run.outcome.trace,
        });
        let json = serde_json::to_string_pretty(&document)
            .context("No se pudo serializar el reporte JSON")?;
        emit(output_dir, &format!("{}_metrics.json", prefix), &json)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.debug);

    let algorithms = args.algorithms()?;
    let (label, descriptors) = args.workload()?;
    let output_dir = args.output_dir.as_deref();
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("No se pudo crear el directorio {}", dir.display()))?;
    }

    log::info!(
        "Carga '{}' con {} procesos, {} algoritmo(s)",
        label,
        descriptors.len(),
        algorithms.len()
    );

    let compare = algorithms.len() > 1;
    let benchmark = Benchmark::with_processes(label, descriptors, algorithms);
    let entries = benchmark.run();

    let calculator = MetricsCalculator::new();
    let mut failed = Vec::new();
    for entry in &entries {
        match &entry.result {
            Ok(run) => emit_run(&args, &entry.algorithm, run, &calculator)?,
            Err(error) => {
                log::error!("La simulación con {} falló: {}", entry.algorithm, error);
                failed.push(entry.algorithm.to_string());
            }
        }
    }

    if compare {
        emit(
            output_dir,
            "comparison.txt",
            &benchmark.comparison_report(&entries),
        )?;
    }

    if !failed.is_empty() {
        anyhow::bail!(
            "{} de {} simulaciones fallaron: {}",
            failed.len(),
            entries.len(),
            failed.join(", ")
        );
    }
    Ok(())
}
