//! # Políticas de Planificación
//!
//! Cada algoritmo implementa el trait [`SchedulingPolicy`]. El motor de
//! simulación mantiene una única instancia detrás de `Box<dyn SchedulingPolicy>`
//! y nunca inspecciona su tipo concreto: la política decide el orden de las
//! colas, el motor se encarga de los estados, el tiempo y la traza.
//!
//! Las políticas trabajan con índices dentro del arreglo de procesos del
//! motor, que está ordenado por `(arrival_time, id)` y no cambia durante
//! la ejecución.

mod fcfs;
mod mlfq;
mod round_robin;
mod rr_priority;
mod sjn;
mod srtf;

pub use fcfs::FcfsPolicy;
pub use mlfq::MlfqPolicy;
pub use round_robin::RoundRobinPolicy;
pub use rr_priority::RoundRobinPriorityPolicy;
pub use sjn::SjnPolicy;
pub use srtf::SrtfPolicy;

use crate::process::Process;

/// Decisión de despacho devuelta por una política.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    /// Índice del proceso elegido
    pub index: usize,
    /// Tiempo que puede ejecutar sin interrupción hasta el próximo punto de decisión
    pub run_for: u64,
}

impl Dispatch {
    pub fn new(index: usize, run_for: u64) -> Self {
        Self { index, run_for }
    }

    /// Mantiene al proceso en ejecución con lo que le queda de su porción.
    pub fn resume(slot: RunningSlot) -> Self {
        Self {
            index: slot.index,
            run_for: slot.slice_left,
        }
    }
}

/// Proceso que ocupa la CPU en un punto de decisión a mitad de porción.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningSlot {
    /// Índice del proceso en ejecución
    pub index: usize,
    /// Tiempo que le queda de la porción concedida
    pub slice_left: u64,
}

/// Contrato común de todas las políticas de planificación.
pub trait SchedulingPolicy: Send {
    /// Nombre corto de la política para logs y reportes.
    fn name(&self) -> &'static str;

    /// Un proceso pasó a `Ready` por primera vez; la política decide a qué
    /// estructura interna se une.
    fn admit(&mut self, index: usize, processes: &mut [Process]);

    /// Elige el próximo proceso a ejecutar y por cuánto tiempo.
    ///
    /// Con `running == None` la CPU está libre y `None` significa inactividad.
    /// Con `running == Some(slot)` el motor está en un punto de decisión a
    /// mitad de porción (llegada bajo una política que expropia por llegada,
    /// o un boost); devolver el mismo índice mantiene al proceso, devolver
    /// otro lo expropia. En ese caso la política debe devolver siempre
    /// `Some`.
    fn select_next(
        &mut self,
        now: u64,
        running: Option<RunningSlot>,
        processes: &[Process],
    ) -> Option<Dispatch>;

    /// El proceso fue retirado de la CPU antes de terminar; la política
    /// decide dónde vuelve a encolarse.
    fn on_preempt(&mut self, index: usize, processes: &mut [Process]);

    /// Si es `true`, cada llegada durante una porción es un punto de decisión
    /// en el que `select_next` recibe el proceso en ejecución.
    fn preempts_on_arrival(&self) -> bool {
        false
    }

    /// Próximo instante en que la política necesita un boost, si usa boosts.
    fn next_boost_at(&self) -> Option<u64> {
        None
    }

    /// Aplica el boost pendiente. `running` es el proceso en CPU, si lo hay.
    fn boost(&mut self, _now: u64, _running: Option<usize>, _processes: &mut [Process]) {}
}
