//! Core types for the cooperative scheduler
//!
//! This module defines the fundamental types used by the scheduler:
//! - Task metadata (registration-time configuration)
//! - Periodic due-time tracking
//! - Task statistics (runtime monitoring)
//! - Scheduler statistics (global metrics)

/// Task metadata supplied at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMetadata {
    /// Human-readable task name for logging and debugging
    pub name: &'static str,

    /// Minimum time between two runs in milliseconds
    ///
    /// Zero runs the task on every scheduler pass.
    pub interval_ms: u32,

    /// Execution time budget in microseconds
    ///
    /// A run longer than this is counted as an overrun. Cooperative tasks
    /// must return promptly, so budgets are a few milliseconds at most.
    pub budget_us: u32,
}

impl TaskMetadata {
    pub const fn new(name: &'static str, interval_ms: u32, budget_us: u32) -> Self {
        Self {
            name,
            interval_ms,
            budget_us,
        }
    }

    /// Check if execution time is within budget
    #[inline]
    pub const fn is_within_budget(&self, execution_us: u32) -> bool {
        execution_us <= self.budget_us
    }
}

/// Elapsed-time due check for one periodic activity
///
/// `last_run_ms` never decreases, and the task is due at most once per
/// `interval_ms` window no matter how often it is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    interval_ms: u32,
    last_run_ms: u64,
}

impl PeriodicTask {
    /// Task first due one interval after `start_ms`
    pub const fn new(interval_ms: u32, start_ms: u64) -> Self {
        Self {
            interval_ms,
            last_run_ms: start_ms,
        }
    }

    pub const fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub const fn last_run_ms(&self) -> u64 {
        self.last_run_ms
    }

    /// Whether the task would run at `now_ms`, without marking it
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_run_ms) >= u64::from(self.interval_ms)
    }

    /// Mark the task as run if due and report whether it was
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if !self.is_due(now_ms) {
            return false;
        }
        if now_ms > self.last_run_ms {
            self.last_run_ms = now_ms;
        }
        true
    }
}

/// Runtime statistics for a single task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Last execution time in microseconds
    pub last_execution_us: u32,

    /// Average execution time in microseconds (exponential moving average)
    ///
    /// Uses EMA with alpha = 0.1 to smooth out variations while remaining responsive
    /// to changes in execution time.
    pub avg_execution_us: u32,

    /// Maximum execution time observed in microseconds
    pub max_execution_us: u32,

    /// Number of runs longer than the task budget
    pub overruns: u32,

    /// Total number of executions
    pub execution_count: u64,
}

impl TaskStats {
    /// Update statistics with a new execution measurement
    pub fn update(&mut self, execution_us: u32, budget_us: u32) {
        self.last_execution_us = execution_us;
        self.execution_count = self.execution_count.saturating_add(1);

        // EMA with alpha = 0.1 in fixed point: avg_new = (value + 9 * avg_old) / 10
        if self.execution_count == 1 {
            self.avg_execution_us = execution_us;
        } else {
            let blended = (u64::from(execution_us) + 9 * u64::from(self.avg_execution_us)) / 10;
            self.avg_execution_us = blended as u32;
        }

        if execution_us > self.max_execution_us {
            self.max_execution_us = execution_us;
        }

        if execution_us > budget_us {
            self.overruns = self.overruns.saturating_add(1);
        }
    }

    /// Reset all statistics to initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Global scheduler statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Share of the last monitoring window spent in task actions (0-100)
    pub cpu_load_percent: u8,

    /// Total overruns across all tasks
    pub total_overruns: u32,

    /// Milliseconds since the scheduler started
    pub uptime_ms: u64,
}

impl SchedulerStats {
    /// Update CPU load percentage from busy time over a window
    pub fn update_cpu_load(&mut self, total_execution_us: u64, window_us: u64) {
        if window_us > 0 {
            let load = (total_execution_us * 100) / window_us;
            self.cpu_load_percent = load.min(100) as u8;
        }
    }

    /// Sum overruns from all tasks
    pub fn update_overruns<'a>(&mut self, task_stats: impl Iterator<Item = &'a TaskStats>) {
        self.total_overruns = task_stats.map(|s| s.overruns).sum();
    }
}
