// Debug-build tracing for the recovery path
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        eprintln!("[TRACE] {}", format_args!($($arg)*));
    };
}

pub mod checkpoint;
pub mod resume;
pub mod persist;
pub mod bootstrap;

pub use checkpoint::*;
pub use resume::*;
pub use persist::*;
pub use bootstrap::*;
