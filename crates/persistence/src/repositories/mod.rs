//! Repository implementations.

pub mod attendance;
pub mod calendar;
pub mod run;

pub use attendance::{AttendanceRepository, RegisterStatus};
pub use calendar::{is_code_collision, CalendarRepository};
pub use run::RunRepository;
