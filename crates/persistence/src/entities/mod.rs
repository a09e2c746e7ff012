//! Entity definitions (database row mappings).

pub mod attendance;
pub mod calendar_day;
pub mod run;

pub use attendance::{AttendanceEntity, HistoryRowEntity};
pub use calendar_day::{CalendarDayEntity, MonthDayRow};
pub use run::RunEntity;
