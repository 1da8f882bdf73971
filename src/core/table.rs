use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use crate::tasks::{TaskId, TaskInfo};

/// Records of tracked tasks plus the cancellation tokens of periodic ones.
///
/// Both maps live behind the registry's single reader/writer lock.
#[derive(Default)]
pub(crate) struct Table {
    pub(crate) tasks: HashMap<TaskId, TaskInfo>,
    pub(crate) cancels: HashMap<TaskId, CancellationToken>,
    /// Set once by teardown; launches are refused afterwards.
    pub(crate) closed: bool,
}

impl Table {
    pub(crate) fn insert(&mut self, info: TaskInfo, cancel: Option<CancellationToken>) {
        let id = info.id();
        self.tasks.insert(id, info);
        if let Some(token) = cancel {
            self.cancels.insert(id, token);
        }
    }

    /// Removes one record and its token (used when the thread could not be spawned).
    pub(crate) fn remove(&mut self, id: TaskId) -> Option<TaskInfo> {
        self.cancels.remove(&id);
        self.tasks.remove(&id)
    }

    /// Removes every record whose completion has fired, with its token.
    pub(crate) fn drain_finished(&mut self) -> Vec<TaskInfo> {
        let finished: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|(_, info)| info.is_finished())
            .map(|(id, _)| *id)
            .collect();

        finished
            .into_iter()
            .filter_map(|id| self.remove(id))
            .collect()
    }
}
