//! Workspace - the aggregate of schema, tasks, filters, sort and view.
//!
//! A workspace is a plain value. Commands never mutate it in place:
//! [`Workspace::apply`] returns the next workspace, and a failed command
//! leaves the original untouched.

use crate::command::{BulkUpdate, FilterInput};
use crate::filter::FilterSet;
use crate::page::{paginate, total_pages, ViewState};
use crate::record::{conform_attrs, Attributes};
use crate::schema::is_permanent;
use crate::sort::{sort_tasks, SortState};
use crate::{
    error::Result, Command, CustomField, Filter, Schema, SnapshotPatch, Task, TaskId, TaskStore,
    Timestamp,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Whether a stored field definition is usable.
///
/// Definitions without a name or label, and any whose name contains
/// `count`, are dropped whenever a snapshot is loaded or saved.
pub fn is_loadable_field(field: &CustomField) -> bool {
    !field.name.is_empty() && !field.label.is_empty() && !field.name.contains("count")
}

/// The complete state of one task list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    schema: Schema,
    store: TaskStore,
    filters: FilterSet,
    sort: SortState,
    view: ViewState,
}

/// One page of the filtered, sorted tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub tasks: Vec<Task>,
    /// Tasks passing the active filters, across all pages
    pub total_count: usize,
    pub total_pages: u32,
    pub current_page: u32,
    pub page_size: u32,
}

impl Workspace {
    /// Create a workspace with the built-in fields and nothing else.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// All tasks in insertion order, ignoring filters.
    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Apply a command and return the resulting workspace.
    ///
    /// `now` is the current time in milliseconds; it seeds the id of a new
    /// task. On error the receiver is unchanged and nothing is returned.
    pub fn apply(&self, command: Command, now: Timestamp) -> Result<Workspace> {
        let mut next = self.clone();
        next.execute(command, now)?;
        Ok(next)
    }

    fn execute(&mut self, command: Command, now: Timestamp) -> Result<()> {
        match command {
            Command::AddTask(attrs) => {
                self.add_task(attrs, now);
            }
            Command::UpdateTask(task) => self.update_task(task),
            Command::BulkUpdateTasks(bulk) => self.bulk_update(bulk),
            Command::DeleteTask(id) => {
                self.store.delete(id);
            }
            Command::BulkDeleteTasks(ids) => {
                self.store.bulk_delete(&ids);
            }
            Command::AddFilter(input) => self.add_filter(input),
            Command::RemoveFilter(field) => {
                self.filters.remove(&field);
                self.view.reset_page();
            }
            Command::ClearAllFilters => {
                self.filters.clear();
                self.view.reset_page();
            }
            Command::SetSort(field) => {
                self.sort.toggle(&field);
                self.view.reset_page();
            }
            Command::SetCurrentPage(page) => self.view.set_page(page)?,
            Command::SetPageSize(size) => self.view.set_page_size(size)?,
            Command::AddCustomField(def) => self.add_field(def)?,
            Command::RemoveCustomField(name) => self.remove_field(&name),
            Command::LoadFromStorage(patch) => self.load(patch),
            Command::ResetToDefaults => {
                *self = Workspace::new();
            }
        }
        Ok(())
    }

    fn add_task(&mut self, attrs: Attributes, now: Timestamp) -> TaskId {
        let attrs = conform_attrs(attrs, &self.schema);
        self.store.create(attrs, now)
    }

    fn update_task(&mut self, task: Task) {
        let attrs = conform_attrs(task.attrs, &self.schema);
        self.store.update(task.id, attrs);
    }

    fn bulk_update(&mut self, bulk: BulkUpdate) {
        let patch = conform_attrs(bulk.update_data, &self.schema);
        self.store.bulk_update(&bulk.task_ids, &patch);
    }

    fn add_filter(&mut self, input: FilterInput) {
        self.filters.remove(&input.field);
        if let Some(value) = input.value.filter(|v| !v.is_empty()) {
            self.filters
                .upsert(Filter::new(input.field, input.operator, value));
        }
        self.view.reset_page();
    }

    fn add_field(&mut self, def: CustomField) -> Result<()> {
        let field = self.schema.validate_new_field(def)?;
        let zero = field.field_type.zero_value();
        debug!(field = %field.name, field_type = %field.field_type, "adding custom field");

        self.store.backfill(&field.name, &zero);
        self.schema.push(field);
        let schema = &self.schema;
        self.store.for_each_mut(|task| task.conform(schema));
        Ok(())
    }

    fn remove_field(&mut self, name: &str) {
        if is_permanent(name) {
            debug!(field = %name, "ignoring removal of permanent field");
            return;
        }
        match self.schema.remove(name) {
            Some(_) => debug!(field = %name, "removing custom field"),
            None => debug!(field = %name, "removing attribute without a field definition"),
        }
        self.store.remove_attribute(name);
        self.filters.remove(name);
    }

    fn load(&mut self, patch: SnapshotPatch) {
        if let Some(fields) = patch.custom_fields {
            let mut schema = Schema::new(fields);
            schema.retain(is_loadable_field);
            let restored = schema.restore_permanent();
            if !restored.is_empty() {
                debug!(fields = ?restored, "restored permanent fields missing from load");
            }
            self.schema = schema;
        }
        if let Some(tasks) = patch.tasks {
            self.store.replace(tasks);
        }
        if let Some(filters) = patch.active_filters {
            self.filters = FilterSet::from_filters(filters);
        }
        if let Some(sort_by) = patch.sort_by {
            self.sort.sort_by = sort_by;
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort.sort_order = sort_order;
        }
        if let Some(page) = patch.current_page {
            self.view.current_page = page.max(1);
        }
        if let Some(size) = patch.page_size {
            self.view.page_size = size;
        }

        let schema = &self.schema;
        self.store.for_each_mut(|task| task.conform(schema));
    }

    /// Tasks passing every active filter, in sort order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .store
            .tasks()
            .iter()
            .filter(|t| self.filters.matches(t, &self.schema))
            .collect();
        sort_tasks(
            &mut tasks,
            &self.sort.sort_by,
            self.sort.sort_order,
            &self.schema,
        );
        tasks
    }

    /// The current page of visible tasks.
    pub fn page_view(&self) -> PageView {
        let visible = self.visible_tasks();
        let page = paginate(&visible, self.view.current_page, self.view.page_size);
        PageView {
            tasks: page.iter().map(|t| (*t).clone()).collect(),
            total_count: visible.len(),
            total_pages: total_pages(visible.len(), self.view.page_size),
            current_page: self.view.current_page,
            page_size: self.view.page_size.get(),
        }
    }
}
