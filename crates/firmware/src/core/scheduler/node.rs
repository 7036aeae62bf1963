//! Cooperative node loop
//!
//! Boot runs the bootstrap chain to completion, then registers the periodic
//! tasks and enters the loop. Each pass renders the indicator first, then
//! runs whatever else is due in registration order, then idles for a short
//! fixed wait. No task sleeps; the only blocking in the loop is that idle
//! wait, so the indicator is never more than one idle wait (plus one pass)
//! out of date.
//!
//! | Task         | Interval            | Action                              |
//! |--------------|---------------------|-------------------------------------|
//! | render       | every pass          | draw current health code            |
//! | health_check | `health_check_*`    | detect drops, rate-limited reconnect|
//! | inbound      | every pass          | dispatch queued commands            |
//! | sample       | `sample_*`          | refresh sensor cache                |
//! | publish      | `publish_*`         | publish fresh readings              |
//! | liveness     | `liveness_*`        | publish `alive`                     |
//! | monitor      | `monitor_*`         | log scheduler and session stats     |

use core::fmt;

use heapless::Vec;
use plant_pulse_core::actuator::Actuator;
use plant_pulse_core::health::HealthCode;
use plant_pulse_core::indicator::IndicatorOutput;
use plant_pulse_core::scheduler::{Schedule, SchedulerError, TaskId, TaskMetadata, MAX_TASKS};
use plant_pulse_core::sensors::ChannelSource;

use super::monitor;
use crate::communication::bootstrap::{BootstrapChain, BootstrapError};
use crate::communication::session::{SessionConfig, SessionManager};
use crate::core::context::NodeContext;
use crate::core::status::{IndicatorPause, StatusDisplay};
use crate::parameters::{ConfigError, NodeParams};
use crate::platform::traits::{ClockSource, MessageSession, NetworkInterface, TimerInterface};

/// Hardware and transport handles the node drives
pub struct Peripherals<T, N, K, S, C, A, O> {
    pub timer: T,
    pub network: N,
    pub clock: K,
    pub session: S,
    pub sensors: C,
    pub actuator: A,
    pub indicator: O,
}

/// Why the node stopped before entering the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeError {
    Config(ConfigError),
    Bootstrap(BootstrapError),
    Scheduler(SchedulerError),
}

impl NodeError {
    /// Health code shown while halted
    pub fn health(self) -> HealthCode {
        match self {
            NodeError::Bootstrap(e) => e.health(),
            // Without a usable configuration the node can never obtain an identity
            NodeError::Config(_) | NodeError::Scheduler(_) => HealthCode::IdentityFailed,
        }
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::Config(e) => write!(f, "configuration: {}", e),
            NodeError::Bootstrap(e) => write!(f, "bootstrap: {}", e),
            NodeError::Scheduler(e) => write!(f, "scheduler: {}", e),
        }
    }
}

impl From<ConfigError> for NodeError {
    fn from(e: ConfigError) -> Self {
        NodeError::Config(e)
    }
}

impl From<SchedulerError> for NodeError {
    fn from(e: SchedulerError) -> Self {
        NodeError::Scheduler(e)
    }
}

/// Periodic activities, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTask {
    Render,
    HealthCheck,
    Inbound,
    Sample,
    Publish,
    Liveness,
    Monitor,
}

impl NodeTask {
    pub const ALL: [NodeTask; 7] = [
        NodeTask::Render,
        NodeTask::HealthCheck,
        NodeTask::Inbound,
        NodeTask::Sample,
        NodeTask::Publish,
        NodeTask::Liveness,
        NodeTask::Monitor,
    ];

    /// Name, interval and execution budget (us)
    pub fn metadata(self, params: &NodeParams) -> TaskMetadata {
        match self {
            NodeTask::Render => TaskMetadata::new("render", 0, 2_000),
            NodeTask::HealthCheck => {
                TaskMetadata::new("health_check", params.health_check_interval_ms, 100_000)
            }
            NodeTask::Inbound => TaskMetadata::new("inbound", 0, 20_000),
            NodeTask::Sample => TaskMetadata::new("sample", params.sample_interval_ms, 10_000),
            NodeTask::Publish => TaskMetadata::new("publish", params.publish_interval_ms, 50_000),
            NodeTask::Liveness => {
                TaskMetadata::new("liveness", params.liveness_interval_ms, 50_000)
            }
            NodeTask::Monitor => TaskMetadata::new("monitor", params.monitor_interval_ms, 5_000),
        }
    }
}

/// Bootstrapped node ready to run
pub struct Node<T, N, K, S, C, A, O>
where
    T: TimerInterface,
    N: NetworkInterface,
    K: ClockSource,
    S: MessageSession,
    C: ChannelSource,
    A: Actuator,
    O: IndicatorOutput,
{
    params: NodeParams,
    ctx: NodeContext,
    sessions: SessionManager,
    schedule: Schedule,
    /// Indexed by `TaskId`
    tasks: Vec<NodeTask, MAX_TASKS>,
    peripherals: Peripherals<T, N, K, S, C, A, O>,
}

/// Node stopped with a fatal health code
pub struct Halted<T, N, K, S, C, A, O> {
    error: NodeError,
    status: StatusDisplay,
    idle_wait_ms: u32,
    peripherals: Peripherals<T, N, K, S, C, A, O>,
}

impl<T, N, K, S, C, A, O> Halted<T, N, K, S, C, A, O>
where
    T: TimerInterface,
    O: IndicatorOutput,
{
    fn new(
        error: NodeError,
        mut status: StatusDisplay,
        idle_wait_ms: u32,
        peripherals: Peripherals<T, N, K, S, C, A, O>,
    ) -> Self {
        status.set(error.health());
        Self {
            error,
            status,
            idle_wait_ms,
            peripherals,
        }
    }

    pub fn error(&self) -> NodeError {
        self.error
    }

    pub fn health(&self) -> HealthCode {
        self.status.health()
    }

    pub fn peripherals(&self) -> &Peripherals<T, N, K, S, C, A, O> {
        &self.peripherals
    }

    /// Keep rendering the fatal pattern until reboot
    pub fn hold(mut self) -> ! {
        crate::log_error!("Node halted: {}", self.error);
        let Peripherals {
            timer, indicator, ..
        } = &mut self.peripherals;
        let mut pause = IndicatorPause::new(timer, indicator, &mut self.status, self.idle_wait_ms);
        loop {
            pause.wait(self.idle_wait_ms.max(1));
        }
    }
}

/// Validate, bootstrap and start the node
///
/// On any fatal failure the peripherals are handed back inside [`Halted`]
/// with the fatal code already set.
pub fn boot<T, N, K, S, C, A, O>(
    params: NodeParams,
    mut peripherals: Peripherals<T, N, K, S, C, A, O>,
) -> Result<Node<T, N, K, S, C, A, O>, Halted<T, N, K, S, C, A, O>>
where
    T: TimerInterface,
    N: NetworkInterface,
    K: ClockSource,
    S: MessageSession,
    C: ChannelSource,
    A: Actuator,
    O: IndicatorOutput,
{
    let mut status = StatusDisplay::new();
    let idle_wait_ms = params.idle_wait_ms;

    if let Err(e) = params.validate() {
        crate::log_error!("Invalid configuration: {}", e);
        return Err(Halted::new(e.into(), status, idle_wait_ms, peripherals));
    }

    let outcome = {
        let Peripherals {
            timer,
            network,
            clock,
            indicator,
            ..
        } = &mut peripherals;
        let mut pause = IndicatorPause::new(timer, indicator, &mut status, idle_wait_ms);
        BootstrapChain::new(&params).run(network, clock, &mut pause)
    };

    match outcome {
        Ok(outcome) => Node::start(params, outcome.credentials, status, peripherals)
            .map_err(|(error, status, peripherals)| {
                Halted::new(error, status, idle_wait_ms, peripherals)
            }),
        Err(e) => Err(Halted::new(
            NodeError::Bootstrap(e),
            status,
            idle_wait_ms,
            peripherals,
        )),
    }
}

/// Boot and run forever
pub fn run<T, N, K, S, C, A, O>(params: NodeParams, peripherals: Peripherals<T, N, K, S, C, A, O>) -> !
where
    T: TimerInterface,
    N: NetworkInterface,
    K: ClockSource,
    S: MessageSession,
    C: ChannelSource,
    A: Actuator,
    O: IndicatorOutput,
{
    match boot(params, peripherals) {
        Ok(node) => node.run(),
        Err(halted) => halted.hold(),
    }
}

/// Failed start, handing back the display and peripherals
pub type StartError<T, N, K, S, C, A, O> = (NodeError, StatusDisplay, Peripherals<T, N, K, S, C, A, O>);

impl<T, N, K, S, C, A, O> Node<T, N, K, S, C, A, O>
where
    T: TimerInterface,
    N: NetworkInterface,
    K: ClockSource,
    S: MessageSession,
    C: ChannelSource,
    A: Actuator,
    O: IndicatorOutput,
{
    /// Register tasks, warm the cache and make the first connect attempt
    ///
    /// Credentials come from a completed bootstrap. Periodic tasks count
    /// their first interval from the current time.
    pub fn start(
        params: NodeParams,
        credentials: plant_pulse_core::identity::Credentials,
        status: StatusDisplay,
        peripherals: Peripherals<T, N, K, S, C, A, O>,
    ) -> Result<Self, StartError<T, N, K, S, C, A, O>> {
        let config = match SessionConfig::from_params(&params) {
            Ok(config) => config,
            Err(e) => return Err((e.into(), status, peripherals)),
        };
        let ctx = match NodeContext::new(&params, credentials, status.clone()) {
            Ok(ctx) => ctx,
            Err(e) => return Err((e.into(), status, peripherals)),
        };

        let now = peripherals.timer.now_ms();
        let mut schedule = Schedule::new(now);
        let mut tasks = Vec::new();
        for task in NodeTask::ALL {
            let registered = schedule
                .register(task.metadata(&params), now)
                .map_err(NodeError::from)
                .and_then(|_| tasks.push(task).map_err(|_| SchedulerError::RegistryFull.into()));
            if let Err(e) = registered {
                return Err((e, ctx.status, peripherals));
            }
        }

        let mut node = Self {
            params,
            ctx,
            sessions: SessionManager::new(config),
            schedule,
            tasks,
            peripherals,
        };

        crate::log_info!(
            "Node started: {} tasks, data topic {}",
            node.schedule.len(),
            node.ctx.credentials.topics.data.as_str()
        );
        node.sample(now);
        node.sessions.ensure_connected(
            &mut node.ctx,
            &mut node.peripherals.session,
            &mut node.peripherals.network,
            now,
        );
        Ok(node)
    }

    pub fn context(&self) -> &NodeContext {
        &self.ctx
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn peripherals(&self) -> &Peripherals<T, N, K, S, C, A, O> {
        &self.peripherals
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<T, N, K, S, C, A, O> {
        &mut self.peripherals
    }

    /// Run every due task once; returns how many ran
    pub fn run_pass(&mut self) -> usize {
        let now = self.peripherals.timer.now_ms();
        let due = self.schedule.due(now);

        for &id in due.iter() {
            let Some(task) = self.tasks.get(id).copied() else {
                continue;
            };
            let start_us = self.peripherals.timer.now_us();
            self.run_task(task, now);
            let elapsed_us = self.peripherals.timer.now_us().saturating_sub(start_us);
            self.record(id, u32::try_from(elapsed_us).unwrap_or(u32::MAX));
        }

        due.len()
    }

    /// Loop until the timer reaches `until_ms`
    pub fn run_until(&mut self, until_ms: u64) {
        while self.peripherals.timer.now_ms() < until_ms {
            self.run_pass();
            self.idle();
        }
    }

    /// Loop forever
    pub fn run(mut self) -> ! {
        loop {
            self.run_pass();
            self.idle();
        }
    }

    fn idle(&mut self) {
        if self.peripherals.timer.delay_ms(self.params.idle_wait_ms).is_err() {
            crate::log_warn!("Idle wait failed");
        }
    }

    fn record(&mut self, id: TaskId, elapsed_us: u32) {
        if let Err(e) = self.schedule.record(id, elapsed_us) {
            crate::log_error!("Task stats: {}", e);
        }
    }

    fn run_task(&mut self, task: NodeTask, now: u64) {
        let p = &mut self.peripherals;
        match task {
            NodeTask::Render => {
                self.ctx.status.render(now, &mut p.indicator);
            }
            NodeTask::HealthCheck => {
                self.sessions
                    .ensure_connected(&mut self.ctx, &mut p.session, &mut p.network, now);
            }
            NodeTask::Inbound => {
                self.sessions
                    .service_inbound(&mut self.ctx, &mut p.session, &mut p.actuator);
            }
            NodeTask::Sample => self.sample(now),
            NodeTask::Publish => {
                self.sessions.publish_data(&mut self.ctx, &mut p.session, now);
            }
            NodeTask::Liveness => {
                self.sessions.publish_liveness(&self.ctx, &mut p.session);
            }
            NodeTask::Monitor => {
                monitor::collect_and_report_stats(&mut self.schedule, self.sessions.stats(), now);
            }
        }
    }

    fn sample(&mut self, now: u64) {
        let report = self.ctx.cache.sample(now, &mut self.peripherals.sensors);
        for channel in report.rejected.iter() {
            let required = self
                .params
                .channels
                .iter()
                .any(|c| c.channel == *channel && c.required);
            if required {
                crate::log_warn!("Sensor {} reading rejected", channel.key());
            } else {
                crate::log_debug!("Optional sensor {} unavailable", channel.key());
            }
        }
    }
}
