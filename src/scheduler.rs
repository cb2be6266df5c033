use crate::{
    decode_response, encode_request, queue::TaskQueue, read_frame, Command, CommandDescriptor,
    DataStore, Error, FrameReader, NotInvokableSnafu, NotPollableSnafu, PendingTask, Priority,
    Registry, SpawnSnafu, TaskKind, Transport, TransportIoSnafu, TransportLostSnafu,
};
use log::{debug, error, info, trace, warn};
use snafu::ResultExt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Struct for configuring a `Scheduler`.
#[non_exhaustive]
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Pause between writing a request and reading its response. Default is 5 ms.
    pub message_delay: Duration,
    /// Maximum number of caller tasks waiting in the queue. Default is 64.
    pub queue_capacity: usize,
    /// Command table to poll from. Default is [`Registry::standard`].
    pub registry: Registry,
}

impl Config {
    pub const fn default() -> Self {
        Self {
            message_delay: Duration::from_millis(5),
            queue_capacity: 64,
            registry: Registry::standard(),
        }
    }

    pub const fn with_message_delay(mut self, message_delay: Duration) -> Self {
        self.message_delay = message_delay;
        self
    }

    pub const fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub const fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }
}

struct Shared {
    queue: TaskQueue,
    running: AtomicBool,
}

type Worker<T> = JoinHandle<(T, Result<(), Error>)>;

/// Drives all traffic on a transport from one background thread.
///
/// While running, every pollable command of the registry is requested in
/// priority order; once the queue drains it is seeded again from the top.
/// High priority commands are therefore refreshed far more often than low
/// priority ones, which are only guaranteed one slot per cycle.
pub struct Scheduler<T: Transport + 'static> {
    config: Config,
    shared: Arc<Shared>,
    store: DataStore,
    transport: Option<T>,
    worker: Option<Worker<T>>,
}

impl<T: Transport + 'static> Scheduler<T> {
    /// Creates an idle scheduler owning `transport`.
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: TaskQueue::new(config.queue_capacity),
                running: AtomicBool::new(false),
            }),
            store: DataStore::new(),
            transport: Some(transport),
            worker: None,
            config,
        }
    }

    /// Returns a handle to the values published by the scheduler.
    pub fn store(&self) -> DataStore {
        self.store.clone()
    }

    /// Returns `true` while the worker thread is polling.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Starts the worker thread. Does nothing if it is already running.
    ///
    /// A worker that ended on a transport failure is reaped and replaced.
    /// Fails with [`Error::TransportLost`] once a spawn failure has consumed
    /// the transport.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.is_running() {
            return Ok(());
        }
        if let Err(e) = self.reap() {
            warn!("Restarting after worker failure: {e}");
        }

        let Some(mut transport) = self.transport.take() else {
            return TransportLostSnafu.fail();
        };

        let shared = self.shared.clone();
        let store = self.store.clone();
        let config = self.config;

        shared.queue.clear();
        shared.running.store(true, Ordering::Release);

        let worker = thread::Builder::new()
            .name("msp-scheduler".into())
            .spawn(move || {
                let result = run(&mut transport, &shared, &store, &config);
                shared.running.store(false, Ordering::Release);
                if let Err(e) = &result {
                    error!("Scheduler stopped: {e}");
                }
                (transport, result)
            });

        match worker {
            Ok(worker) => {
                info!("Scheduler started");
                self.worker = Some(worker);
                Ok(())
            }
            Err(source) => {
                self.shared.running.store(false, Ordering::Release);
                Err(source).context(SpawnSnafu)
            }
        }
    }

    /// Stops the worker thread and waits for it to exit. Does nothing if the
    /// scheduler is idle.
    ///
    /// Returns the transport failure that ended the worker, if any.
    pub fn stop(&mut self) -> Result<(), Error> {
        if self.worker.is_none() {
            return Ok(());
        }

        self.shared.running.store(false, Ordering::Release);
        self.shared.queue.clear();
        let result = self.reap();
        info!("Scheduler stopped");
        result
    }

    /// Joins a worker that has been told to stop or has failed.
    fn reap(&mut self) -> Result<(), Error> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        match worker.join() {
            Ok((transport, result)) => {
                self.transport = Some(transport);
                result
            }
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Queues a set command or action with `data` laid out as the command's fields.
    ///
    /// Unknown commands, commands without a priority and data that does not
    /// match the layout are rejected. While the scheduler is idle, or when the
    /// queue is full, the call is silently dropped.
    pub fn execute(&self, code: impl Into<u8>, data: &[i64]) -> Result<(), Error> {
        let descriptor = self.config.registry.lookup(code)?;
        let Some(priority) = descriptor.priority else {
            return NotInvokableSnafu {
                command: descriptor.command,
            }
            .fail();
        };
        encode_request(descriptor, data)?;

        let kind = if data.is_empty() && descriptor.command.is_get() {
            TaskKind::Poll
        } else {
            TaskKind::Write(data.to_vec())
        };
        self.enqueue(priority, descriptor.command, kind);
        Ok(())
    }

    /// Queues a single poll of a get command, including those the scheduler
    /// never polls on its own.
    pub fn request(&self, code: impl Into<u8>) -> Result<(), Error> {
        let descriptor = self.config.registry.lookup(code)?;
        if !descriptor.command.is_get() {
            return NotPollableSnafu {
                command: descriptor.command,
            }
            .fail();
        }

        let priority = descriptor.priority.unwrap_or(Priority::Low);
        self.enqueue(priority, descriptor.command, TaskKind::Poll);
        Ok(())
    }

    fn enqueue(&self, priority: Priority, command: Command, kind: TaskKind) {
        if !self.is_running() {
            debug!("Scheduler idle, ignoring {command:?}");
            return;
        }
        if !self.shared.queue.push(priority, command, kind) {
            warn!("Task queue full, dropping {command:?}");
        }
    }

    /// Stops the scheduler and gives the transport back.
    ///
    /// Call [`Scheduler::stop`] first to observe a worker failure.
    pub fn into_transport(mut self) -> Option<T> {
        if let Err(e) = self.stop() {
            debug!("Worker failure discarded: {e}");
        }
        self.transport.take()
    }
}

impl<T: Transport + 'static> Drop for Scheduler<T> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            debug!("Worker failure discarded: {e}");
        }
    }
}

/// Worker loop. Only transport failures end it early.
fn run<T: Transport>(
    transport: &mut T,
    shared: &Shared,
    store: &DataStore,
    config: &Config,
) -> Result<(), Error> {
    let mut reader = FrameReader::new();

    while shared.running.load(Ordering::Acquire) {
        let added = shared.queue.refill(config.registry.all_pollable());
        if added > 0 {
            trace!("Queued {added} polls");
        }

        // Empty after `stop` drained it, or with nothing to poll
        let Some(task) = shared.queue.pop() else {
            thread::sleep(config.message_delay);
            continue;
        };

        let Ok(descriptor) = config.registry.lookup(task.command) else {
            warn!("Skipping unregistered {:?}", task.command);
            continue;
        };

        round_trip(transport, &mut reader, store, config, descriptor, &task)?;
        trace!("{} tasks pending", shared.queue.len());
    }

    Ok(())
}

fn round_trip<T: Transport>(
    transport: &mut T,
    reader: &mut FrameReader,
    store: &DataStore,
    config: &Config,
    descriptor: &CommandDescriptor,
    task: &PendingTask,
) -> Result<(), Error> {
    let request = match encode_request(descriptor, task.write_data().unwrap_or_default()) {
        Ok(request) => request,
        Err(e) => {
            warn!("Skipping {:?}: {e}", descriptor.command);
            return Ok(());
        }
    };

    // Stale bytes of an earlier exchange must not be read as this response
    transport.clear().context(TransportIoSnafu)?;
    reader.reset();

    transport.write_all(&request).context(TransportIoSnafu)?;
    transport.flush().context(TransportIoSnafu)?;

    thread::sleep(config.message_delay);

    if task.kind != TaskKind::Poll {
        return Ok(());
    }

    let frame = read_frame(reader, transport).context(TransportIoSnafu)?;
    match decode_response(descriptor, &frame) {
        Ok(values) => store.update(descriptor.command, values),
        Err(e) => debug!("Dropping response to {:?}: {e}", descriptor.command),
    }

    Ok(())
}
