use crate::{values::FromRaw, Command, Error};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// Last decoded payload of one command.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// One value per field, repetitions included.
    pub values: Arc<[i64]>,
    /// When the response was decoded.
    pub received_at: Instant,
}

impl Sample {
    /// Time elapsed since the response was decoded.
    pub fn age(&self) -> Duration {
        self.received_at.elapsed()
    }
}

/// Latest known payload per command.
///
/// Only the scheduler writes; any thread may read. Entries are replaced as a
/// whole, so a reader sees either the previous or the new payload.
#[derive(Clone, Default)]
pub struct DataStore {
    entries: Arc<RwLock<HashMap<Command, Sample>>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Command, Sample>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Command, Sample>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces the payload of `command`.
    pub(crate) fn update(&self, command: Command, values: Vec<i64>) {
        let sample = Sample {
            values: values.into(),
            received_at: Instant::now(),
        };
        self.write().insert(command, sample);
    }

    /// Returns the last payload of `command`, or `None` if the flight
    /// controller has not answered it yet.
    pub fn get(&self, command: Command) -> Option<Arc<[i64]>> {
        self.read().get(&command).map(|sample| sample.values.clone())
    }

    /// Like [`DataStore::get`], with the time of reception.
    pub fn sample(&self, command: Command) -> Option<Sample> {
        self.read().get(&command).cloned()
    }

    /// Decodes the last payload of `T::COMMAND` into a record.
    pub fn get_as<T: FromRaw>(&self) -> Result<Option<T>, Error> {
        self.get(T::COMMAND)
            .map(|values| T::from_raw(&values))
            .transpose()
    }

    /// Commands that have been answered at least once.
    pub fn populated(&self) -> Vec<Command> {
        self.read().keys().copied().collect()
    }

    /// Forgets every payload.
    pub fn clear(&self) {
        self.write().clear();
    }
}
