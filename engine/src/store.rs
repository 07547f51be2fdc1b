//! Store - the ordered task collection.
//!
//! The store owns task identity. It applies create, update and delete
//! commands and never validates attribute values against the schema; that is
//! left to whoever builds the command.

use crate::{record::Attributes, FieldName, Task, TaskId, Timestamp, Value};
use std::collections::HashSet;

/// The task collection, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    /// Highest id ever issued or loaded
    last_id: TaskId,
}

// Two stores are equal when they hold the same tasks; the id high-water
// mark is bookkeeping.
impl PartialEq for TaskStore {
    fn eq(&self, other: &Self) -> bool {
        self.tasks == other.tasks
    }
}

impl TaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `tasks`.
    ///
    /// Id allocation resumes after the largest id present.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        Self { tasks, last_id }
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Consume the store and return its tasks.
    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by id.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Whether a task with this id exists.
    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Highest id ever issued or loaded.
    pub fn last_id(&self) -> TaskId {
        self.last_id
    }

    fn next_id(&mut self, now: Timestamp) -> TaskId {
        let id = now.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }

    /// Insert a new task and return its id.
    ///
    /// The id is `now` unless that would not be strictly greater than every
    /// id issued so far. An `id` key inside `attrs` is ignored.
    pub fn create(&mut self, mut attrs: Attributes, now: Timestamp) -> TaskId {
        attrs.remove("id");
        let id = self.next_id(now);
        self.tasks.push(Task::new(id, attrs));
        id
    }

    /// Merge attributes into the task with this id.
    ///
    /// Returns `false` (and changes nothing) if no such task exists.
    pub fn update(&mut self, id: TaskId, mut attrs: Attributes) -> bool {
        attrs.remove("id");
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.merge(attrs);
                true
            }
            None => false,
        }
    }

    /// Assign every key of `patch` onto every task whose id is in `ids`.
    ///
    /// Returns the number of tasks touched.
    pub fn bulk_update(&mut self, ids: &[TaskId], patch: &Attributes) -> usize {
        let ids: HashSet<_> = ids.iter().copied().collect();
        let mut touched = 0;
        for task in self.tasks.iter_mut().filter(|t| ids.contains(&t.id)) {
            for (key, value) in patch.iter().filter(|(k, _)| k.as_str() != "id") {
                task.set(key.clone(), value.clone());
            }
            touched += 1;
        }
        touched
    }

    /// Remove the task with this id. Returns whether it existed.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Remove every task whose id is in `ids`. Returns the number removed.
    pub fn bulk_delete(&mut self, ids: &[TaskId]) -> usize {
        let ids: HashSet<_> = ids.iter().copied().collect();
        let before = self.tasks.len();
        self.tasks.retain(|t| !ids.contains(&t.id));
        before - self.tasks.len()
    }

    /// Swap in a new task list, keeping ids monotonic across the swap.
    pub(crate) fn replace(&mut self, tasks: Vec<Task>) {
        let loaded = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        self.last_id = self.last_id.max(loaded);
        self.tasks = tasks;
    }

    /// Give every task `value` for `field` unless it already has one.
    pub(crate) fn backfill(&mut self, field: &str, value: &Value) {
        for task in &mut self.tasks {
            if !task.attrs.contains_key(field) {
                task.set(field, value.clone());
            }
        }
    }

    /// Drop `field` from every task.
    pub(crate) fn remove_attribute(&mut self, field: &str) {
        for task in &mut self.tasks {
            task.attrs.remove(field);
        }
    }

    /// Apply `f` to every task.
    pub(crate) fn for_each_mut(&mut self, f: impl FnMut(&mut Task)) {
        self.tasks.iter_mut().for_each(f);
    }
}

/// Build an attribute bag from `(name, value)` pairs.
pub fn attributes<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<FieldName>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(n: u64) -> TaskStore {
        let mut store = TaskStore::new();
        for i in 1..=n {
            store.create(attributes([("title", format!("task {}", i))]), i);
        }
        store
    }

    #[test]
    fn create_assigns_now_as_id() {
        let mut store = TaskStore::new();
        let id = store.create(attributes([("title", "a")]), 1706745600000);
        assert_eq!(id, 1706745600000);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).unwrap().get("title"), Some(&Value::from("a")));
    }

    #[test]
    fn ids_unique_within_same_millisecond() {
        let mut store = TaskStore::new();
        let a = store.create(Attributes::new(), 1000);
        let b = store.create(Attributes::new(), 1000);
        let c = store.create(Attributes::new(), 999);
        assert_eq!((a, b, c), (1000, 1001, 1002));
    }

    #[test]
    fn ids_never_reused_after_delete() {
        let mut store = store_with(3);
        assert!(store.delete(3));
        let id = store.create(Attributes::new(), 0);
        assert_eq!(id, 4);
    }

    #[test]
    fn create_ignores_id_attribute() {
        let mut store = TaskStore::new();
        let id = store.create(attributes([("id", 99)]), 5);
        assert_eq!(id, 5);
        assert!(store.get(5).unwrap().get("id").is_none());
    }

    #[test]
    fn from_tasks_resumes_ids() {
        let store = TaskStore::from_tasks(vec![Task::new(40, Attributes::new())]);
        assert_eq!(store.last_id(), 40);
        let mut store = store;
        assert_eq!(store.create(Attributes::new(), 10), 41);
    }

    #[test]
    fn update_merges() {
        let mut store = store_with(2);
        assert!(store.update(1, attributes([("title", "renamed"), ("extra", "x")])));
        let task = store.get(1).unwrap();
        assert_eq!(task.get("title"), Some(&Value::from("renamed")));
        assert_eq!(task.get("extra"), Some(&Value::from("x")));
    }

    #[test]
    fn update_missing_is_noop() {
        let mut store = store_with(2);
        let before = store.clone();
        assert!(!store.update(99, attributes([("title", "x")])));
        assert_eq!(store, before);
    }

    #[test]
    fn bulk_update_only_touches_selected() {
        let mut store = store_with(3);
        let touched = store.bulk_update(&[1, 3, 42], &attributes([("status", "completed")]));
        assert_eq!(touched, 2);
        assert_eq!(
            store.get(1).unwrap().get("status"),
            Some(&Value::from("completed"))
        );
        assert!(store.get(2).unwrap().get("status").is_none());
        assert_eq!(
            store.get(3).unwrap().get("status"),
            Some(&Value::from("completed"))
        );
    }

    #[test]
    fn delete_and_bulk_delete() {
        let mut store = store_with(3);
        assert!(!store.delete(99));
        assert_eq!(store.bulk_delete(&[1, 3, 99]), 2);
        let ids: Vec<_> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn backfill_keeps_existing_values() {
        let mut store = store_with(2);
        store.update(1, attributes([("estimate", 5)]));
        store.backfill("estimate", &Value::Num(0.0));
        assert_eq!(store.get(1).unwrap().get("estimate"), Some(&Value::Num(5.0)));
        assert_eq!(store.get(2).unwrap().get("estimate"), Some(&Value::Num(0.0)));

        store.remove_attribute("estimate");
        assert!(store.tasks().iter().all(|t| t.get("estimate").is_none()));
    }
}
