//! # Módulo de Traza de Ejecución
//!
//! La traza es un registro ordenado, sólo de anexado, de los eventos de CPU
//! emitidos por el motor. A partir de ella se recuperan los intervalos de
//! ocupación de la CPU y se cuentan los cambios de contexto.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tipo de evento registrado en la traza.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceEvent {
    /// El proceso pasa a ocupar la CPU
    Dispatch,
    /// El proceso es retirado de la CPU antes de terminar
    Preempt,
    /// El proceso terminó su ráfaga
    Complete,
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatch => write!(f, "dispatch"),
            Self::Preempt => write!(f, "preempt"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Una muestra de la traza.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Instante simulado del evento
    pub time: u64,
    /// Proceso afectado
    pub process_id: u32,
    /// Evento ocurrido
    pub event: TraceEvent,
}

/// Intervalo continuo en que un proceso ocupó la CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Proceso que ocupó la CPU
    pub process_id: u32,
    /// Inicio del intervalo (dispatch)
    pub start: u64,
    /// Fin del intervalo (preempt o complete)
    pub end: u64,
}

impl Segment {
    /// Duración del intervalo.
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }
}

/// Registro de eventos de una ejecución completa.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionTrace {
    entries: Vec<TraceEntry>,
}

impl ExecutionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un evento al final de la traza.
    ///
    /// Los instantes deben ser no decrecientes; los empates conservan el
    /// orden de emisión.
    pub fn record(&mut self, time: u64, process_id: u32, event: TraceEvent) {
        debug_assert!(self.entries.last().map_or(true, |last| last.time <= time));
        self.entries.push(TraceEntry {
            time,
            process_id,
            event,
        });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Número de eventos de un tipo dado.
    pub fn count(&self, event: TraceEvent) -> usize {
        self.entries.iter().filter(|e| e.event == event).count()
    }

    /// Número de eventos de un tipo dado para un proceso.
    pub fn count_for(&self, process_id: u32, event: TraceEvent) -> usize {
        self.entries
            .iter()
            .filter(|e| e.process_id == process_id && e.event == event)
            .count()
    }

    /// Cambios de contexto: despachos posteriores al primero.
    ///
    /// El motor sólo registra un `dispatch` cuando la CPU cambia de manos,
    /// así que cada despacho después del primero es un cambio.
    pub fn context_switches(&self) -> usize {
        self.count(TraceEvent::Dispatch).saturating_sub(1)
    }

    /// Recupera los intervalos de ocupación de la CPU.
    ///
    /// Cada `dispatch` se empareja con el siguiente `preempt` o `complete`
    /// del mismo proceso.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cpu_scheduling_simulator::{ExecutionTrace, TraceEvent};
    ///
    /// let mut trace = ExecutionTrace::new();
    /// trace.record(0, 1, TraceEvent::Dispatch);
    /// trace.record(2, 1, TraceEvent::Preempt);
    /// trace.record(2, 2, TraceEvent::Dispatch);
    /// trace.record(3, 2, TraceEvent::Complete);
    ///
    /// let segments = trace.segments();
    /// assert_eq!(segments.len(), 2);
    /// assert_eq!(trace.busy_time(), 3);
    /// ```
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut open: Option<(u32, u64)> = None;

        for entry in &self.entries {
            match entry.event {
                TraceEvent::Dispatch => open = Some((entry.process_id, entry.time)),
                TraceEvent::Preempt | TraceEvent::Complete => {
                    if let Some((process_id, start)) = open {
                        if process_id == entry.process_id {
                            segments.push(Segment {
                                process_id,
                                start,
                                end: entry.time,
                            });
                            open = None;
                        }
                    }
                }
            }
        }

        segments
    }

    /// Tiempo total en que la CPU estuvo ocupada.
    pub fn busy_time(&self) -> u64 {
        self.segments().iter().map(Segment::duration).sum()
    }

    /// Ids de proceso en el orden en que terminaron.
    pub fn completion_order(&self) -> Vec<u32> {
        self.entries
            .iter()
            .filter(|e| e.event == TraceEvent::Complete)
            .map(|e| e.process_id)
            .collect()
    }
}
