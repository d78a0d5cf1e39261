//! # Módulo de Procesos
//!
//! Este módulo define los descriptores de proceso que llegan desde fuera del
//! núcleo y la entidad `Process` que el motor de simulación hace avanzar por
//! sus estados durante una ejecución.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

/// Descriptor externo de un proceso.
///
/// Es la forma en que los generadores de carga (presets, archivos JSON,
/// la línea de comandos) entregan procesos al núcleo. Los campos numéricos
/// son con signo para poder rechazar valores negativos con un error claro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    /// Identificador único del proceso
    pub id: u32,
    /// Nombre legible; si falta se usa `P<id>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Instante simulado de llegada
    pub arrival_time: i64,
    /// Tiempo total de CPU requerido
    pub burst_time: i64,
    /// Prioridad (menor valor = mayor prioridad)
    #[serde(default)]
    pub priority: i32,
}

impl ProcessDescriptor {
    /// Crea un descriptor sin nombre explícito.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::ProcessDescriptor;
    ///
    /// let descriptor = ProcessDescriptor::new(1, 0, 5, 2);
    /// assert_eq!(descriptor.display_name(), "P1");
    /// ```
    pub fn new(id: u32, arrival_time: i64, burst_time: i64, priority: i32) -> Self {
        Self {
            id,
            name: None,
            arrival_time,
            burst_time,
            priority,
        }
    }

    /// Asigna un nombre legible al descriptor.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Nombre a mostrar en reportes.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("P{}", self.id))
    }

    /// Verifica que los valores del descriptor sean válidos.
    ///
    /// # Errors
    ///
    /// `SchedulerError::InvalidDescriptor` si la llegada es negativa,
    /// la ráfaga no es positiva o la prioridad es negativa.
    pub fn validate(&self) -> Result<()> {
        if self.arrival_time < 0 {
            return Err(SchedulerError::invalid_descriptor(
                Some(self.id),
                format!("tiempo de llegada negativo ({})", self.arrival_time),
            ));
        }
        if self.burst_time <= 0 {
            return Err(SchedulerError::invalid_descriptor(
                Some(self.id),
                format!("la ráfaga debe ser > 0 (recibido {})", self.burst_time),
            ));
        }
        if self.priority < 0 {
            return Err(SchedulerError::invalid_descriptor(
                Some(self.id),
                format!("prioridad negativa ({})", self.priority),
            ));
        }
        Ok(())
    }
}

/// Estados por los que pasa un proceso durante la simulación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    /// Aún no ha llegado (t < arrival_time)
    Unarrived,
    /// Listo para ejecutarse, esperando en alguna cola de la política
    Ready,
    /// Ocupando la CPU
    Running,
    /// Terminó toda su ráfaga
    Completed,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unarrived => "sin llegar",
            Self::Ready => "listo",
            Self::Running => "ejecutando",
            Self::Completed => "completado",
        };
        f.write_str(label)
    }
}

/// Proceso dentro de una ejecución de la simulación.
///
/// Los campos del descriptor son inmutables; el resto es estado de ejecución
/// que sólo modifica el motor (y `mlfq_level`, que sólo modifica la política
/// MLFQ).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Process {
    /// Identificador único del proceso
    pub id: u32,
    /// Nombre legible para reportes
    pub name: String,
    /// Instante simulado de llegada
    pub arrival_time: u64,
    /// Tiempo total de CPU requerido
    pub burst_time: u64,
    /// Prioridad (menor valor = mayor prioridad)
    pub priority: i32,
    /// Tiempo de CPU que aún le falta
    pub remaining_time: u64,
    /// Estado actual
    pub state: ProcessState,
    /// Instante del primer despacho
    pub start_time: Option<u64>,
    /// Instante de finalización
    pub completion_time: Option<u64>,
    /// Nivel de cola bajo MLFQ (0 = máxima prioridad)
    pub mlfq_level: usize,
}

impl Process {
    /// Crea un proceso a partir de un descriptor válido.
    ///
    /// # Errors
    ///
    /// `SchedulerError::InvalidDescriptor` si el descriptor no pasa la validación.
    pub fn from_descriptor(descriptor: &ProcessDescriptor) -> Result<Self> {
        descriptor.validate()?;

        let burst_time = descriptor.burst_time as u64;
        Ok(Self {
            id: descriptor.id,
            name: descriptor.display_name(),
            arrival_time: descriptor.arrival_time as u64,
            burst_time,
            priority: descriptor.priority,
            remaining_time: burst_time,
            state: ProcessState::Unarrived,
            start_time: None,
            completion_time: None,
            mlfq_level: 0,
        })
    }

    /// Verifica si el proceso terminó su ráfaga.
    pub fn is_completed(&self) -> bool {
        self.state == ProcessState::Completed
    }

    /// Verifica si el proceso está listo para ser despachado.
    pub fn is_ready(&self) -> bool {
        self.state == ProcessState::Ready
    }

    /// Tiempo de CPU ya consumido.
    pub fn executed_time(&self) -> u64 {
        self.burst_time - self.remaining_time
    }

    /// Transición `Unarrived -> Ready`.
    pub(crate) fn mark_ready(&mut self) {
        debug_assert_eq!(self.state, ProcessState::Unarrived);
        self.state = ProcessState::Ready;
    }

    /// Transición `Ready -> Running`. Registra el inicio sólo la primera vez.
    pub(crate) fn mark_running(&mut self, now: u64) {
        self.state = ProcessState::Running;
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
    }

    /// Transición `Running -> Ready` por expropiación.
    pub(crate) fn mark_preempted(&mut self) {
        self.state = ProcessState::Ready;
    }

    /// Transición `Running -> Completed`.
    pub(crate) fn mark_completed(&mut self, now: u64) {
        self.state = ProcessState::Completed;
        self.completion_time = Some(now);
    }

    /// Descuenta tiempo ejecutado del restante.
    pub(crate) fn consume(&mut self, elapsed: u64) {
        self.remaining_time = self.remaining_time.saturating_sub(elapsed);
    }

    /// Resumen de una línea útil para logging.
    pub fn status_summary(&self) -> String {
        format!(
            "{} (id {}): {} , restante {}/{}",
            self.name, self.id, self.state, self.remaining_time, self.burst_time
        )
    }
}

/// Valida y normaliza una lista de descriptores.
///
/// Rechaza listas vacías, ids duplicados y descriptores inválidos; ordena
/// el resultado de forma estable por `(arrival_time, id)`.
///
/// # Examples
///
/// ```rust
/// use cpu_scheduling_simulator::{ProcessDescriptor, process::prepare_processes};
///
/// let processes = prepare_processes(&[
///     ProcessDescriptor::new(2, 3, 4, 0),
///     ProcessDescriptor::new(1, 0, 2, 0),
/// ]).unwrap();
/// assert_eq!(processes[0].id, 1);
/// ```
pub fn prepare_processes(descriptors: &[ProcessDescriptor]) -> Result<Vec<Process>> {
    if descriptors.is_empty() {
        return Err(SchedulerError::invalid_descriptor(
            None,
            "la carga no contiene procesos",
        ));
    }

    let mut seen = HashSet::new();
    let mut processes = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if !seen.insert(descriptor.id) {
            return Err(SchedulerError::invalid_descriptor(
                Some(descriptor.id),
                "id duplicado",
            ));
        }
        processes.push(Process::from_descriptor(descriptor)?);
    }

    check_time_horizon(&processes)?;
    processes.sort_by_key(|p| (p.arrival_time, p.id));
    Ok(processes)
}

/// El último evento ocurre a más tardar en `max(llegada) + suma(ráfagas)`;
/// ese instante debe caber en el reloj simulado.
fn check_time_horizon(processes: &[Process]) -> Result<()> {
    let latest_arrival = processes.iter().map(|p| p.arrival_time).max().unwrap_or(0);
    processes
        .iter()
        .try_fold(latest_arrival, |horizon, p| horizon.checked_add(p.burst_time))
        .map(|_| ())
        .ok_or_else(|| {
            SchedulerError::invalid_descriptor(
                None,
                "la suma de llegadas y ráfagas excede el rango del reloj simulado",
            )
        })
}
