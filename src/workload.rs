//! Cargas de trabajo predefinidas.
//!
//! Conjuntos fijos de procesos para demostraciones y comparaciones. Cada
//! preset es determinista: la misma carga produce siempre la misma traza.
//! [`RandomWorkload`] genera cargas pseudoaleatorias reproducibles a partir
//! de una semilla.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config;
use crate::error::{Result, SchedulerError};
use crate::process::ProcessDescriptor;

/// Carga de trabajo con nombre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Workload {
    /// Los cinco procesos de demostración de [`config::controlled_processes`]
    Controlled,
    /// Ráfagas cortas con un único proceso largo
    IoBound,
    /// Ráfagas largas
    CpuBound,
    /// Mezcla de ráfagas cortas y largas
    Mixed,
    /// Llegadas seguidas con ráfagas decrecientes
    ArrivalBurst,
    /// Prioridades repetidas para ejercitar RR-Priority
    Priority,
}

impl Workload {
    pub const ALL: [Workload; 6] = [
        Self::Controlled,
        Self::IoBound,
        Self::CpuBound,
        Self::Mixed,
        Self::ArrivalBurst,
        Self::Priority,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Controlled => "controlled",
            Self::IoBound => "io-bound",
            Self::CpuBound => "cpu-bound",
            Self::Mixed => "mixed",
            Self::ArrivalBurst => "arrival-burst",
            Self::Priority => "priority",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Controlled => "Carga controlada de demostración (5 procesos)",
            Self::IoBound => "Procesos cortos, tipo E/S, con un proceso largo",
            Self::CpuBound => "Procesos largos intensivos en CPU",
            Self::Mixed => "Mezcla de procesos cortos y largos",
            Self::ArrivalBurst => "Ráfaga de llegadas con duraciones decrecientes",
            Self::Priority => "Prioridades repetidas",
        }
    }

    /// Descriptores de la carga, con ids consecutivos desde 1.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::Workload;
    ///
    /// let processes = Workload::CpuBound.processes();
    /// assert_eq!(processes.len(), 10);
    /// assert_eq!(processes[0].burst_time, 10);
    /// ```
    pub fn processes(&self) -> Vec<ProcessDescriptor> {
        // (llegada, ráfaga, prioridad)
        let specs: &[(i64, i64, i32)] = match self {
            Self::Controlled => return config::controlled_processes(),
            Self::IoBound => &[
                (0, 2, 3),
                (1, 1, 5),
                (2, 3, 2),
                (3, 1, 4),
                (4, 2, 1),
                (5, 15, 3),
                (6, 1, 5),
                (7, 2, 4),
                (8, 3, 2),
                (9, 1, 1),
            ],
            Self::CpuBound => &[
                (0, 10, 3),
                (2, 15, 5),
                (4, 8, 2),
                (6, 20, 4),
                (8, 3, 1),
                (10, 12, 3),
                (12, 2, 5),
                (14, 18, 4),
                (16, 9, 2),
                (18, 14, 1),
            ],
            Self::Mixed => &[
                (0, 8, 3),
                (1, 2, 5),
                (3, 15, 2),
                (5, 3, 4),
                (6, 10, 1),
                (8, 1, 3),
                (9, 12, 5),
                (10, 5, 4),
                (12, 4, 2),
                (14, 20, 1),
            ],
            Self::ArrivalBurst => &[
                (0, 20, 3),
                (2, 18, 5),
                (4, 16, 2),
                (6, 14, 4),
                (8, 12, 1),
                (10, 10, 3),
                (12, 8, 5),
                (14, 6, 4),
                (16, 4, 2),
                (18, 2, 1),
            ],
            Self::Priority => &[
                (0, 10, 1),
                (2, 8, 2),
                (4, 6, 1),
                (6, 10, 3),
                (8, 8, 3),
                (10, 6, 2),
                (12, 10, 5),
                (14, 8, 5),
                (16, 6, 4),
                (18, 4, 4),
            ],
        };

        specs
            .iter()
            .zip(1..)
            .map(|(&(arrival, burst, priority), id)| ProcessDescriptor::new(id, arrival, burst, priority))
            .collect()
    }
}

impl FromStr for Workload {
    type Err = SchedulerError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().replace('_', "-").as_str() {
            "controlled" | "controlado" => Ok(Self::Controlled),
            "io-bound" | "io" => Ok(Self::IoBound),
            "cpu-bound" | "cpu" => Ok(Self::CpuBound),
            "mixed" | "mixto" => Ok(Self::Mixed),
            "arrival-burst" | "burst" => Ok(Self::ArrivalBurst),
            "priority" | "prioridad" => Ok(Self::Priority),
            other => Err(SchedulerError::invalid_descriptor(
                None,
                format!("carga de trabajo desconocida: {}", other),
            )),
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generador de cargas aleatorias con semilla fija.
///
/// Llegadas en `0..=max_arrival`, ráfagas en `1..=max_burst` y prioridades en
/// `1..=max_priority`, con ids consecutivos desde 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RandomWorkload {
    pub count: usize,
    pub seed: u64,
    pub max_arrival: i64,
    pub max_burst: i64,
    pub max_priority: i32,
}

impl Default for RandomWorkload {
    fn default() -> Self {
        Self {
            count: config::DEFAULT_RANDOM_PROCESSES,
            seed: config::DEFAULT_SEED,
            max_arrival: 20,
            max_burst: 20,
            max_priority: 10,
        }
    }
}

impl RandomWorkload {
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            count,
            seed,
            ..Self::default()
        }
    }

    /// Etiqueta para reportes, p. ej. `random-42`.
    pub fn label(&self) -> String {
        format!("random-{}", self.seed)
    }

    /// Genera los descriptores. La misma configuración produce siempre la
    /// misma carga.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::RandomWorkload;
    ///
    /// let generator = RandomWorkload::new(8, 7);
    /// let processes = generator.processes().unwrap();
    /// assert_eq!(processes.len(), 8);
    /// assert_eq!(processes, generator.processes().unwrap());
    /// ```
    pub fn processes(&self) -> Result<Vec<ProcessDescriptor>> {
        if self.max_arrival < 0 || self.max_burst < 1 || self.max_priority < 1 {
            return Err(SchedulerError::invalid_descriptor(
                None,
                format!(
                    "rangos aleatorios inválidos: llegada 0..={}, ráfaga 1..={}, prioridad 1..={}",
                    self.max_arrival, self.max_burst, self.max_priority
                ),
            ));
        }
        let count = u32::try_from(self.count).map_err(|_| {
            SchedulerError::invalid_descriptor(
                None,
                format!("demasiados procesos: {}", self.count),
            )
        })?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let descriptors = (1..=count)
            .map(|id| {
                let arrival = rng.gen_range(0..=self.max_arrival);
                let burst = rng.gen_range(1..=self.max_burst);
                let priority = rng.gen_range(1..=self.max_priority);
                ProcessDescriptor::new(id, arrival, burst, priority)
            })
            .collect();

        log::debug!(
            "[WORKLOAD] {} procesos aleatorios con semilla {}",
            count,
            self.seed
        );
        Ok(descriptors)
    }
}
