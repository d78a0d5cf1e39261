//! # Módulo de Errores
//!
//! Define los tipos de error que puede producir el núcleo de simulación.
//! Todos los errores son deterministas: la misma entrada produce siempre
//! el mismo error, por lo que ninguno se reintenta.

use std::fmt;

/// Errores del simulador de planificación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Un descriptor de proceso tiene valores inválidos (llegada negativa,
    /// ráfaga no positiva, prioridad negativa, id duplicado o carga vacía).
    /// La simulación se rechaza antes de comenzar.
    InvalidDescriptor {
        /// Id del proceso afectado, si el error es de un proceso concreto
        process_id: Option<u32>,
        /// Descripción del problema
        reason: String,
    },

    /// La configuración del algoritmo es inválida (quantum nulo, cero niveles,
    /// intervalo de boost nulo, nombre de algoritmo desconocido...).
    PolicyConfiguration(String),

    /// Una política devolvió una decisión imposible. Indica un defecto en la
    /// implementación de la política, nunca un problema de los datos.
    InvariantViolation {
        /// Instante simulado en que se detectó la violación
        time: u64,
        /// Descripción de la violación
        reason: String,
    },
}

impl SchedulerError {
    pub(crate) fn invalid_descriptor(process_id: Option<u32>, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            process_id,
            reason: reason.into(),
        }
    }

    pub(crate) fn invariant(time: u64, reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            time,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDescriptor {
                process_id: Some(id),
                reason,
            } => write!(f, "descriptor inválido para el proceso {}: {}", id, reason),
            Self::InvalidDescriptor {
                process_id: None,
                reason,
            } => write!(f, "carga de trabajo inválida: {}", reason),
            Self::PolicyConfiguration(reason) => {
                write!(f, "configuración de política inválida: {}", reason)
            }
            Self::InvariantViolation { time, reason } => {
                write!(f, "violación de invariante en t={}: {}", time, reason)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

/// Resultado con el error del simulador.
pub type Result<T> = std::result::Result<T, SchedulerError>;
