//! Process-level I/O: signal handling, the single-instance lock and the
//! network probe.

pub mod lock;
pub mod network;
pub mod signals;
