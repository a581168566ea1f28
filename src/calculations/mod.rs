pub mod critical_path;
pub mod schedule_calculator;

pub use critical_path::{
    CriticalPath, CriticalPathAnalysis, SLACK_EPSILON, TaskTiming, calculate_critical_path,
};
pub use schedule_calculator::{
    ScheduleCalculator, ScheduledDates, calculate_schedule, calculate_schedule_as_of,
};
