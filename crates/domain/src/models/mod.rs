//! Domain models and wire DTOs.

pub mod attendance;
pub mod calendar;
pub mod outcome;
pub mod run;

pub use attendance::{
    Attendance, HistoryQuery, HistoryRecord, HistoryResponse, RegisterRequest, RegisterResponse,
    TodayAttendanceResponse,
};
pub use calendar::{
    CalendarDaySummary, ConfigureDayRequest, ConfigureDayResponse, MonthQuery, MonthResponse,
    TodayResponse,
};
pub use outcome::RegisterOutcome;
pub use run::Run;
