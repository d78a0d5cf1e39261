//! # Módulo de Algoritmos de Planificación
//!
//! Este módulo resuelve la configuración de un algoritmo (nombre más
//! parámetros) en una instancia concreta de política. El nombre se
//! convierte una sola vez en un [`AlgorithmKind`] cerrado; los nombres
//! desconocidos se rechazan en ese punto.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config;
use crate::error::{Result, SchedulerError};
use crate::policies::{
    FcfsPolicy, MlfqPolicy, RoundRobinPolicy, RoundRobinPriorityPolicy, SchedulingPolicy,
    SjnPolicy, SrtfPolicy,
};

/// Conjunto cerrado de algoritmos disponibles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    Fcfs,
    Rr,
    RrPriority,
    Sjn,
    Srtf,
    Mlfq,
}

impl AlgorithmKind {
    /// Todos los algoritmos, en el orden en que se comparan.
    pub const ALL: [AlgorithmKind; 6] = [
        Self::Fcfs,
        Self::Rr,
        Self::RrPriority,
        Self::Sjn,
        Self::Srtf,
        Self::Mlfq,
    ];

    /// Identificador usado en la línea de comandos.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fcfs => "fcfs",
            Self::Rr => "rr",
            Self::RrPriority => "rr_priority",
            Self::Sjn => "sjn",
            Self::Srtf => "srtf",
            Self::Mlfq => "mlfq",
        }
    }

    /// Combina el tipo de algoritmo con sus parámetros.
    ///
    /// # Errors
    ///
    /// `SchedulerError::PolicyConfiguration` si falta un parámetro requerido
    /// o tiene un valor inválido.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::{AlgorithmKind, PolicySettings, SchedulingAlgorithm};
    ///
    /// let algorithm = AlgorithmKind::Rr.configure(&PolicySettings::default()).unwrap();
    /// assert_eq!(algorithm, SchedulingAlgorithm::round_robin(2));
    /// ```
    pub fn configure(self, settings: &PolicySettings) -> Result<SchedulingAlgorithm> {
        let algorithm = match self {
            Self::Fcfs => SchedulingAlgorithm::Fcfs,
            Self::Sjn => SchedulingAlgorithm::Sjn,
            Self::Srtf => SchedulingAlgorithm::Srtf,
            Self::Rr => SchedulingAlgorithm::RoundRobin {
                quantum: settings.require_quantum(self)?,
            },
            Self::RrPriority => SchedulingAlgorithm::RoundRobinPriority {
                quantum: settings.require_quantum(self)?,
            },
            Self::Mlfq => SchedulingAlgorithm::Mlfq(settings.mlfq_config()?),
        };
        algorithm.validate()?;
        Ok(algorithm)
    }
}

impl FromStr for AlgorithmKind {
    type Err = SchedulerError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "fcfs" => Ok(Self::Fcfs),
            "rr" | "round_robin" => Ok(Self::Rr),
            "rr_priority" | "priority" => Ok(Self::RrPriority),
            "sjn" | "sjf" => Ok(Self::Sjn),
            "srtf" => Ok(Self::Srtf),
            "mlfq" => Ok(Self::Mlfq),
            other => Err(SchedulerError::PolicyConfiguration(format!(
                "algoritmo desconocido: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parámetros específicos de cada política.
///
/// Los valores por defecto salen de [`crate::config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySettings {
    /// Quantum para `rr` y `rr_priority`
    pub quantum: Option<u64>,
    /// Número de niveles de MLFQ
    pub mlfq_levels: usize,
    /// Quantum del nivel 0 de MLFQ; cada nivel duplica al anterior
    pub mlfq_base_quantum: u64,
    /// Lista explícita de quanta por nivel (tiene precedencia sobre los dos anteriores)
    pub mlfq_quanta: Option<Vec<u64>>,
    /// Intervalo entre boosts de MLFQ
    pub boost_interval: u64,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            quantum: Some(config::DEFAULT_QUANTUM),
            mlfq_levels: config::DEFAULT_MLFQ_LEVELS,
            mlfq_base_quantum: config::DEFAULT_MLFQ_BASE_QUANTUM,
            mlfq_quanta: None,
            boost_interval: config::DEFAULT_BOOST_INTERVAL,
        }
    }
}

impl PolicySettings {
    fn require_quantum(&self, kind: AlgorithmKind) -> Result<u64> {
        self.quantum.ok_or_else(|| {
            SchedulerError::PolicyConfiguration(format!("{} requiere un quantum", kind))
        })
    }

    fn mlfq_config(&self) -> Result<MlfqConfig> {
        match &self.mlfq_quanta {
            Some(quanta) => Ok(MlfqConfig {
                quanta: quanta.clone(),
                boost_interval: self.boost_interval,
            }),
            None => MlfqConfig::geometric(
                self.mlfq_levels,
                self.mlfq_base_quantum,
                self.boost_interval,
            ),
        }
    }
}

/// Configuración de MLFQ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MlfqConfig {
    /// Quantum de cada nivel, de mayor a menor prioridad
    pub quanta: Vec<u64>,
    /// Intervalo entre boosts
    pub boost_interval: u64,
}

impl MlfqConfig {
    /// Quanta `base * 2^nivel` para `levels` niveles.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::MlfqConfig;
    ///
    /// let config = MlfqConfig::geometric(3, 2, 50).unwrap();
    /// assert_eq!(config.quanta, vec![2, 4, 8]);
    /// ```
    pub fn geometric(levels: usize, base_quantum: u64, boost_interval: u64) -> Result<Self> {
        if levels == 0 {
            return Err(SchedulerError::PolicyConfiguration(
                "MLFQ necesita al menos un nivel".to_string(),
            ));
        }
        let quanta = (0..levels)
            .map(|level| {
                u32::try_from(level)
                    .ok()
                    .and_then(|shift| 2u64.checked_pow(shift))
                    .and_then(|factor| base_quantum.checked_mul(factor))
                    .ok_or_else(|| {
                        SchedulerError::PolicyConfiguration(format!(
                            "quantum del nivel {} fuera de rango",
                            level
                        ))
                    })
            })
            .collect::<Result<Vec<u64>>>()?;

        Ok(Self {
            quanta,
            boost_interval,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.quanta.is_empty() {
            return Err(SchedulerError::PolicyConfiguration(
                "MLFQ necesita al menos un nivel".to_string(),
            ));
        }
        if self.quanta.iter().any(|&q| q == 0) {
            return Err(SchedulerError::PolicyConfiguration(
                "los quanta de MLFQ deben ser > 0".to_string(),
            ));
        }
        if self.quanta.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(SchedulerError::PolicyConfiguration(format!(
                "los quanta de MLFQ deben ser estrictamente crecientes: {:?}",
                self.quanta
            )));
        }
        if self.boost_interval == 0 {
            return Err(SchedulerError::PolicyConfiguration(
                "el intervalo de boost debe ser > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Algoritmo de planificación ya configurado.
///
/// Es un valor inmutable: cada ejecución construye su propia política con
/// [`SchedulingAlgorithm::build`], de modo que varias ejecuciones nunca
/// comparten estado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SchedulingAlgorithm {
    /// First-Come First-Served: no expropiativo, orden de llegada.
    Fcfs,

    /// Round Robin: expropiativo con quantum fijo.
    RoundRobin {
        /// Tiempo máximo de ejecución continua por turno
        quantum: u64,
    },

    /// Round Robin con prioridades: Round Robin dentro de cada nivel de
    /// prioridad, atendiendo siempre el nivel de menor valor.
    RoundRobinPriority {
        /// Tiempo máximo de ejecución continua por turno
        quantum: u64,
    },

    /// Shortest Job Next: no expropiativo, menor ráfaga primero.
    Sjn,

    /// Shortest Remaining Time First: expropia ante llegadas más cortas.
    Srtf,

    /// Multi-Level Feedback Queue con boost periódico.
    Mlfq(MlfqConfig),
}

impl SchedulingAlgorithm {
    /// Crea un algoritmo FCFS.
    pub fn fcfs() -> Self {
        Self::Fcfs
    }

    /// Crea un algoritmo Round Robin con el quantum especificado.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::SchedulingAlgorithm;
    ///
    /// let algorithm = SchedulingAlgorithm::round_robin(4);
    /// assert!(algorithm.is_preemptive());
    /// ```
    pub fn round_robin(quantum: u64) -> Self {
        Self::RoundRobin { quantum }
    }

    /// Crea un algoritmo Round Robin con prioridades.
    pub fn round_robin_priority(quantum: u64) -> Self {
        Self::RoundRobinPriority { quantum }
    }

    pub fn sjn() -> Self {
        Self::Sjn
    }

    pub fn srtf() -> Self {
        Self::Srtf
    }

    /// Crea un MLFQ con quanta `base * 2^nivel`.
    ///
    /// # Errors
    ///
    /// `SchedulerError::PolicyConfiguration` si `levels` es 0.
    pub fn mlfq(levels: usize, base_quantum: u64, boost_interval: u64) -> Result<Self> {
        Ok(Self::Mlfq(MlfqConfig::geometric(
            levels,
            base_quantum,
            boost_interval,
        )?))
    }

    /// Tipo de algoritmo sin parámetros.
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Self::Fcfs => AlgorithmKind::Fcfs,
            Self::RoundRobin { .. } => AlgorithmKind::Rr,
            Self::RoundRobinPriority { .. } => AlgorithmKind::RrPriority,
            Self::Sjn => AlgorithmKind::Sjn,
            Self::Srtf => AlgorithmKind::Srtf,
            Self::Mlfq(_) => AlgorithmKind::Mlfq,
        }
    }

    /// Determina si el algoritmo puede retirar un proceso de la CPU antes
    /// de que termine.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::SchedulingAlgorithm;
    ///
    /// assert!(!SchedulingAlgorithm::fcfs().is_preemptive());
    /// assert!(!SchedulingAlgorithm::sjn().is_preemptive());
    /// assert!(SchedulingAlgorithm::srtf().is_preemptive());
    /// ```
    pub fn is_preemptive(&self) -> bool {
        !matches!(self, Self::Fcfs | Self::Sjn)
    }

    /// Obtiene el quantum configurado, si el algoritmo usa uno fijo.
    pub fn get_quantum(&self) -> Option<u64> {
        match self {
            Self::RoundRobin { quantum } | Self::RoundRobinPriority { quantum } => Some(*quantum),
            _ => None,
        }
    }

    /// Verifica los parámetros del algoritmo.
    ///
    /// # Errors
    ///
    /// `SchedulerError::PolicyConfiguration` con quantum nulo, cero niveles,
    /// quanta no crecientes o intervalo de boost nulo.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::RoundRobin { quantum } | Self::RoundRobinPriority { quantum }
                if *quantum == 0 =>
            {
                Err(SchedulerError::PolicyConfiguration(format!(
                    "{} requiere quantum > 0",
                    self.kind()
                )))
            }
            Self::Mlfq(config) => config.validate(),
            _ => Ok(()),
        }
    }

    /// Construye una instancia nueva de la política correspondiente.
    ///
    /// # Errors
    ///
    /// Los mismos que [`SchedulingAlgorithm::validate`].
    pub fn build(&self) -> Result<Box<dyn SchedulingPolicy>> {
        self.validate()?;

        let policy: Box<dyn SchedulingPolicy> = match self {
            Self::Fcfs => Box::new(FcfsPolicy::new()),
            Self::RoundRobin { quantum } => Box::new(RoundRobinPolicy::new(*quantum)),
            Self::RoundRobinPriority { quantum } => {
                Box::new(RoundRobinPriorityPolicy::new(*quantum))
            }
            Self::Sjn => Box::new(SjnPolicy::new()),
            Self::Srtf => Box::new(SrtfPolicy::new()),
            Self::Mlfq(config) => Box::new(MlfqPolicy::new(
                config.quanta.clone(),
                config.boost_interval,
            )),
        };
        Ok(policy)
    }

    /// Obtiene una descripción textual del algoritmo.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::SchedulingAlgorithm;
    ///
    /// let fcfs = SchedulingAlgorithm::fcfs();
    /// assert_eq!(fcfs.description(), "First-Come First-Served (no expropiativo)");
    /// ```
    pub fn description(&self) -> String {
        match self {
            Self::Fcfs => "First-Come First-Served (no expropiativo)".to_string(),
            Self::RoundRobin { quantum } => {
                format!("Round Robin expropiativo (quantum: {})", quantum)
            }
            Self::RoundRobinPriority { quantum } => {
                format!("Round Robin con prioridades (quantum: {})", quantum)
            }
            Self::Sjn => "Shortest Job Next (no expropiativo)".to_string(),
            Self::Srtf => "Shortest Remaining Time First (expropiativo)".to_string(),
            Self::Mlfq(config) => format!(
                "Multi-Level Feedback Queue ({} niveles, quanta {:?}, boost cada {})",
                config.quanta.len(),
                config.quanta,
                config.boost_interval
            ),
        }
    }
}

impl fmt::Display for SchedulingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fcfs => write!(f, "FCFS"),
            Self::RoundRobin { quantum } => write!(f, "RR (q={})", quantum),
            Self::RoundRobinPriority { quantum } => write!(f, "RR-Priority (q={})", quantum),
            Self::Sjn => write!(f, "SJN"),
            Self::Srtf => write!(f, "SRTF"),
            Self::Mlfq(config) => write!(
                f,
                "MLFQ ({} niveles, boost {})",
                config.quanta.len(),
                config.boost_interval
            ),
        }
    }
}
