use crate::{Command, CommandDescriptor, Priority};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Mutex, MutexGuard};

/// What the scheduler does with a task once dequeued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// Send an empty request and store the response.
    Poll,
    /// Send the values and do not wait for a response.
    Write(Vec<i64>),
}

/// A unit of work waiting for the serial link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTask {
    pub priority: Priority,
    pub command: Command,
    pub kind: TaskKind,
    seq: u64,
    from_caller: bool,
}

impl PendingTask {
    /// Returns the values to write, if this is a write task.
    pub fn write_data(&self) -> Option<&[i64]> {
        match &self.kind {
            TaskKind::Poll => None,
            TaskKind::Write(data) => Some(data),
        }
    }
}

impl Ord for PendingTask {
    // `BinaryHeap` is a max-heap: the most urgent priority, then the oldest
    // task, compares greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PendingTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Inner {
    heap: BinaryHeap<PendingTask>,
    next_seq: u64,
    /// Tasks in `heap` added through `push`
    caller_tasks: usize,
}

impl Inner {
    fn insert(&mut self, priority: Priority, command: Command, kind: TaskKind, from_caller: bool) {
        let seq = self.next_seq;
        self.next_seq += 1;
        if from_caller {
            self.caller_tasks += 1;
        }
        self.heap.push(PendingTask {
            priority,
            command,
            kind,
            seq,
            from_caller,
        });
    }
}

/// Thread-safe priority queue of pending tasks.
///
/// `capacity` bounds the tasks callers can add with [`TaskQueue::push`]; a
/// push on a full queue is refused. Refilling from the registry always
/// inserts the full seed.
pub(crate) struct TaskQueue {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl TaskQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                next_seq: 0,
                caller_tasks: 0,
            }),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The heap stays consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Adds a task. Returns `false` and drops the task if `capacity` caller
    /// tasks are already waiting. Seeded polls do not count.
    pub fn push(&self, priority: Priority, command: Command, kind: TaskKind) -> bool {
        let mut inner = self.lock();
        if inner.caller_tasks >= self.capacity {
            return false;
        }
        inner.insert(priority, command, kind, true);
        true
    }

    /// Seeds one poll task per descriptor if the queue is empty. Returns the
    /// number of tasks added.
    pub fn refill<I>(&self, descriptors: I) -> usize
    where
        I: IntoIterator<Item = &'static CommandDescriptor>,
    {
        let mut inner = self.lock();
        if !inner.heap.is_empty() {
            return 0;
        }

        let mut added = 0;
        for descriptor in descriptors {
            if let Some(priority) = descriptor.priority {
                inner.insert(priority, descriptor.command, TaskKind::Poll, false);
                added += 1;
            }
        }
        added
    }

    /// Removes the most urgent task.
    pub fn pop(&self) -> Option<PendingTask> {
        let mut inner = self.lock();
        let task = inner.heap.pop()?;
        if task.from_caller {
            inner.caller_tasks -= 1;
        }
        Some(task)
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.heap.clear();
        inner.caller_tasks = 0;
    }

    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }
}
