/// Streak engine: pure computations over a habit's completion records
///
/// Everything derived from completions (the current streak, per-day
/// progress, trend statistics and calendars) is computed here and nowhere
/// else. No function in this module performs I/O or reads the clock except
/// [`day::today`]; callers pass the reference day explicitly, which keeps
/// every result reproducible and safe to compute from concurrent requests.

pub mod day;
pub mod streak;
pub mod progress;
pub mod stats;
pub mod calendar;

pub use day::*;
pub use streak::*;
pub use progress::*;
pub use stats::*;
pub use calendar::*;
