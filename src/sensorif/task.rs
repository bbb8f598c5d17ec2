//! The scheduler task — sole consumer of the command queue.
//!
//! A single long-running loop with two prioritized behaviors per
//! iteration:
//!
//! 1. **Command-driven read** — wait on the inbound queue up to
//!    `command_wait_ms`. A command that arrives in time is serviced
//!    through the registry and its reading pushed downstream.
//! 2. **Idle-time sweep** — on timeout, visit every valid slot in table
//!    order through its default read path, pacing `sweep_pause_ms`
//!    between slots so bus/radio load is spread instead of bursting.
//!
//! The loop alternates between these two states forever; there is no
//! terminal state short of process shutdown. Driver failures are logged
//! and skipped; the only deliberate stall is the outbound
//! `send().await`, which exerts backpressure when the uplink lags.
//!
//! The loop runs as an async task on a dedicated core-pinned thread,
//! sharing a reactor-driven executor with the uplink forwarder
//! (see [`spawn_pipeline`]).

use core::time::Duration;

use log::{info, warn};

use crate::config::SystemConfig;
use crate::drivers::task_pin::{self, Core};
use crate::sensorif::channels::{
    CommandChannel, ReadingChannel, SensorCommand, COMMAND_CHANNEL, READING_CHANNEL,
};
use crate::sensorif::registry::Registry;
use crate::uplink::{self, UplinkSink};

/// Drive the scheduler loop forever.
pub async fn run(
    registry: &Registry,
    commands: &CommandChannel,
    readings: &ReadingChannel,
    config: SystemConfig,
) {
    info!(
        "sensorif: task started (command wait {} ms, sweep pause {} ms, idle sweep {})",
        config.command_wait_ms, config.sweep_pause_ms, config.idle_sweep
    );
    loop {
        run_once(registry, commands, readings, &config).await;
    }
}

/// One full scheduler iteration: a bounded command wait, then either the
/// command service path or (on timeout) an idle sweep.
pub async fn run_once(
    registry: &Registry,
    commands: &CommandChannel,
    readings: &ReadingChannel,
    config: &SystemConfig,
) {
    match next_command(commands, config.command_wait_ms).await {
        Some(cmd) => service_command(registry, readings, cmd).await,
        None => {
            if config.idle_sweep {
                sweep(registry, readings, config.sweep_pause_ms).await;
            }
        }
    }
}

/// Bounded receive: the command future raced against a reactor timer.
async fn next_command(commands: &CommandChannel, wait_ms: u32) -> Option<SensorCommand> {
    futures_lite::future::or(async { Some(commands.receive().await) }, async {
        async_io_mini::Timer::after(Duration::from_millis(u64::from(wait_ms))).await;
        None
    })
    .await
}

/// Service one on-demand read. A failed lookup or driver read is a
/// recoverable, logged event; the sender's own next cycle is the retry
/// point.
async fn service_command(registry: &Registry, readings: &ReadingChannel, cmd: SensorCommand) {
    info!("sensorif: command received for sensor {}", cmd.target);
    match registry.read(cmd.target, &cmd.payload) {
        Ok(reading) => {
            // Unbounded wait: a full queue stalls us until the uplink
            // drains. Backpressure, not an error.
            readings.send(reading).await;
        }
        Err(e) => warn!("sensorif: command read for sensor {} failed: {e}", cmd.target),
    }
}

/// Visit every valid slot in table order through `read_default`.
///
/// The id snapshot is taken once up front; a slot unregistered mid-sweep
/// reads back as `Invalid` and is skipped. An arriving command does not
/// preempt a sweep in progress; the queue is checked once per iteration.
async fn sweep(registry: &Registry, readings: &ReadingChannel, pause_ms: u32) {
    for id in registry.valid_ids() {
        match registry.read_default(id) {
            Ok(reading) => {
                readings.send(reading).await;
                async_io_mini::Timer::after(Duration::from_millis(u64::from(pause_ms))).await;
            }
            Err(e) => warn!("sensorif: sweep read for sensor {id} failed: {e}"),
        }
    }
}

/// Spawn the sensor pipeline on a dedicated APP-core thread: one
/// reactor-driven executor running the scheduler loop and the uplink
/// forwarder as cooperating tasks over the global channels.
pub fn spawn_pipeline(
    registry: &'static Registry,
    config: SystemConfig,
    sink: impl UplinkSink + Send + 'static,
) -> std::thread::JoinHandle<()> {
    task_pin::spawn_pinned(Core::App, 4, 8, "sensor-pipe", move || {
        let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
        executor
            .spawn(run(registry, &COMMAND_CHANNEL, &READING_CHANNEL, config))
            .detach();
        executor.spawn(uplink::run(&READING_CHANNEL, sink)).detach();
        futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
    })
}
