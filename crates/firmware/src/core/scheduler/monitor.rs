//! Monitoring task for scheduler health and performance
//!
//! Periodically closes the scheduler's load window and reports:
//! - CPU load
//! - Budget overruns
//! - Task execution times
//! - Session counters

use plant_pulse_core::scheduler::{Schedule, SchedulerStats};

use crate::communication::session::SessionStats;

/// CPU load warning threshold (percentage)
const CPU_LOAD_WARNING_THRESHOLD: u8 = 75;

/// Collect and report statistics for all registered tasks
pub fn collect_and_report_stats(
    schedule: &mut Schedule,
    session: &SessionStats,
    now_ms: u64,
) -> SchedulerStats {
    let stats = schedule.take_summary(now_ms);

    log_scheduler_summary(&stats);
    check_warnings(schedule, &stats);
    report_task_stats(schedule);
    report_session_stats(session);

    stats
}

/// Log scheduler summary
#[allow(unused_variables)]
fn log_scheduler_summary(stats: &SchedulerStats) {
    crate::log_info!(
        "Scheduler: uptime={}ms cpu={}% overruns={}",
        stats.uptime_ms,
        stats.cpu_load_percent,
        stats.total_overruns
    );
}

/// Check for warning conditions
fn check_warnings(schedule: &Schedule, stats: &SchedulerStats) {
    if stats.cpu_load_percent >= CPU_LOAD_WARNING_THRESHOLD {
        crate::log_warn!("High CPU load: {}%", stats.cpu_load_percent);
    }

    for (_, task) in schedule.iter() {
        if task.stats.overruns > 0 {
            crate::log_warn!(
                "Task '{}': {} overruns (budget {}us, max {}us)",
                task.metadata.name,
                task.stats.overruns,
                task.metadata.budget_us,
                task.stats.max_execution_us
            );
        }
    }
}

/// Report per-task statistics
#[allow(unused_variables)]
fn report_task_stats(schedule: &Schedule) {
    if schedule.is_empty() {
        return;
    }

    crate::log_info!("Task statistics ({} tasks):", schedule.len());

    for (_, task) in schedule.iter() {
        crate::log_info!(
            "  {}: exec={}us (avg={}us, max={}us) overruns={} count={}",
            task.metadata.name,
            task.stats.last_execution_us,
            task.stats.avg_execution_us,
            task.stats.max_execution_us,
            task.stats.overruns,
            task.stats.execution_count
        );
    }
}

#[allow(unused_variables)]
fn report_session_stats(session: &SessionStats) {
    crate::log_info!(
        "Session: rounds={} connects={} drops={} published={} failed={} inbound={}",
        session.connect_rounds,
        session.connects,
        session.drops,
        session.publishes,
        session.publish_failures,
        session.inbound_messages
    );
}
