mod engine;
mod hour_split;
mod segment;
mod session;
mod timeline;

pub use engine::{now_ms, SessionEngine};
pub use hour_split::{build_hour_splits, total_duration_min};
pub use segment::{
    calculate_progress, format_duration_ms, TimerSegment, TimerStatus, TimerType,
    MILLIS_PER_MINUTE,
};
pub use session::{CompletionSummary, NotificationSummary, PomodoroSession};
pub use timeline::{build_segments, plan_segments};
