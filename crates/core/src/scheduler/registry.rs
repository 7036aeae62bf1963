//! Fixed-capacity task registry
//!
//! Tasks are registered once at startup, before the loop runs, and keep
//! their registration order for the life of the process. The registry owns
//! due-time tracking and statistics; the caller owns the actions and runs
//! whatever [`Schedule::due`] hands back.

use core::fmt;

use heapless::Vec;

use super::types::{PeriodicTask, SchedulerStats, TaskMetadata, TaskStats};

/// Maximum number of tasks that can be registered
pub const MAX_TASKS: usize = 8;

/// Index returned by [`Schedule::register`]
pub type TaskId = usize;

/// Tasks due in one pass, in registration order
pub type DueTasks = Vec<TaskId, MAX_TASKS>;

/// Scheduler errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerError {
    /// More than [`MAX_TASKS`] registrations
    RegistryFull,
    /// Id not returned by `register`
    UnknownTask(TaskId),
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::RegistryFull => {
                write!(f, "task registry full ({} tasks)", MAX_TASKS)
            }
            SchedulerError::UnknownTask(id) => write!(f, "unknown task id {}", id),
        }
    }
}

/// One registered task
#[derive(Debug, Clone, Copy)]
pub struct ScheduledTask {
    pub metadata: TaskMetadata,
    pub timing: PeriodicTask,
    pub stats: TaskStats,
}

/// Registry of periodic tasks with per-task statistics
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    tasks: Vec<ScheduledTask, MAX_TASKS>,
    started_ms: u64,
    window_start_ms: u64,
    window_busy_us: u64,
}

impl Schedule {
    /// Empty schedule whose uptime counts from `now_ms`
    pub fn new(now_ms: u64) -> Self {
        Self {
            tasks: Vec::new(),
            started_ms: now_ms,
            window_start_ms: now_ms,
            window_busy_us: 0,
        }
    }

    /// Register a task, first due one interval after `now_ms`
    pub fn register(
        &mut self,
        metadata: TaskMetadata,
        now_ms: u64,
    ) -> Result<TaskId, SchedulerError> {
        let id = self.tasks.len();
        self.tasks
            .push(ScheduledTask {
                metadata,
                timing: PeriodicTask::new(metadata.interval_ms, now_ms),
                stats: TaskStats::default(),
            })
            .map_err(|_| SchedulerError::RegistryFull)?;
        Ok(id)
    }

    /// Collect the tasks due at `now_ms` and mark them as run
    pub fn due(&mut self, now_ms: u64) -> DueTasks {
        let mut due = DueTasks::new();
        for (id, task) in self.tasks.iter_mut().enumerate() {
            if task.timing.poll(now_ms) {
                // Capacity equals MAX_TASKS
                let _ = due.push(id);
            }
        }
        due
    }

    /// Record the measured duration of one run
    pub fn record(&mut self, id: TaskId, execution_us: u32) -> Result<(), SchedulerError> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or(SchedulerError::UnknownTask(id))?;
        task.stats.update(execution_us, task.metadata.budget_us);
        self.window_busy_us = self.window_busy_us.saturating_add(u64::from(execution_us));
        Ok(())
    }

    pub fn get(&self, id: TaskId) -> Option<&ScheduledTask> {
        self.tasks.get(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<(TaskId, &ScheduledTask)> {
        self.iter().find(|(_, task)| task.metadata.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &ScheduledTask)> {
        self.tasks.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Global statistics, closing the current load window
    pub fn take_summary(&mut self, now_ms: u64) -> SchedulerStats {
        let mut stats = SchedulerStats {
            uptime_ms: now_ms.saturating_sub(self.started_ms),
            ..Default::default()
        };
        let window_us = now_ms.saturating_sub(self.window_start_ms) * 1000;
        stats.update_cpu_load(self.window_busy_us, window_us);
        stats.update_overruns(self.tasks.iter().map(|t| &t.stats));

        self.window_start_ms = now_ms;
        self.window_busy_us = 0;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &'static str, interval_ms: u32) -> TaskMetadata {
        TaskMetadata::new(name, interval_ms, 1000)
    }

    #[test]
    fn test_registration_order_and_lookup() {
        let mut schedule = Schedule::new(0);
        let render = schedule.register(meta("render", 0), 0).unwrap();
        let sample = schedule.register(meta("sample", 2000), 0).unwrap();

        assert_eq!(render, 0);
        assert_eq!(sample, 1);
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.find_by_name("sample").map(|(id, _)| id), Some(1));
        assert!(schedule.find_by_name("missing").is_none());
    }

    #[test]
    fn test_registry_full_is_an_error() {
        let mut schedule = Schedule::new(0);
        for _ in 0..MAX_TASKS {
            schedule.register(meta("t", 10), 0).unwrap();
        }
        assert_eq!(
            schedule.register(meta("extra", 10), 0),
            Err(SchedulerError::RegistryFull)
        );
    }

    #[test]
    fn test_due_tasks_in_registration_order() {
        let mut schedule = Schedule::new(0);
        schedule.register(meta("render", 0), 0).unwrap();
        schedule.register(meta("check", 5000), 0).unwrap();
        schedule.register(meta("sample", 2000), 0).unwrap();

        assert_eq!(schedule.due(1000).as_slice(), &[0]);
        assert_eq!(schedule.due(2000).as_slice(), &[0, 2]);
        assert_eq!(schedule.due(5000).as_slice(), &[0, 1, 2]);
        assert_eq!(schedule.due(5001).as_slice(), &[0]);
    }

    #[test]
    fn test_record_updates_stats_and_overruns() {
        let mut schedule = Schedule::new(0);
        let id = schedule.register(meta("publish", 10_000), 0).unwrap();

        schedule.record(id, 400).unwrap();
        schedule.record(id, 1500).unwrap();

        let stats = schedule.get(id).unwrap().stats;
        assert_eq!(stats.execution_count, 2);
        assert_eq!(stats.max_execution_us, 1500);
        assert_eq!(stats.overruns, 1);

        assert_eq!(schedule.record(7, 10), Err(SchedulerError::UnknownTask(7)));
    }

    #[test]
    fn test_summary_window() {
        let mut schedule = Schedule::new(1000);
        let id = schedule.register(meta("sample", 0), 1000).unwrap();
        schedule.record(id, 250_000).unwrap();
        schedule.record(id, 1500).unwrap();

        let summary = schedule.take_summary(2000);
        assert_eq!(summary.uptime_ms, 1000);
        assert_eq!(summary.cpu_load_percent, 25);
        assert_eq!(summary.total_overruns, 2);

        // Window restarts after each summary
        let summary = schedule.take_summary(3000);
        assert_eq!(summary.cpu_load_percent, 0);
        assert_eq!(summary.uptime_ms, 2000);
    }
}
