//! End-to-end scenarios and properties of the query/mutation engine.

use proptest::prelude::*;
use taskgrid_engine::{
    evaluate, paginate,
    persistence::{restore, sanitize_for_save},
    sort_tasks, store::attributes, total_pages, Command, CustomField, FieldType, Filter,
    FilterInput, PageSize, SortOrder, Task, Value, Workspace, STORAGE_KEY,
};

fn estimate_field() -> CustomField {
    CustomField::new("estimate", "Estimate", FieldType::Number)
}

fn add_task(ws: Workspace, pairs: Vec<(&str, Value)>, now: u64) -> Workspace {
    ws.apply(Command::AddTask(attributes(pairs)), now).unwrap()
}

fn ids(tasks: &[&Task]) -> Vec<u64> {
    tasks.iter().map(|t| t.id).collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn adding_estimate_backfills_existing_tasks() {
    let mut ws = Workspace::new();
    for (i, title) in ["one", "two", "three"].iter().enumerate() {
        ws = add_task(ws, vec![("title", Value::from(*title))], 10 + i as u64);
    }

    let ws = ws
        .apply(Command::AddCustomField(estimate_field()), 20)
        .unwrap();
    assert_eq!(ws.schema().len(), 4);
    for task in ws.tasks() {
        assert_eq!(task.get("estimate"), Some(&Value::Num(0.0)));
    }
}

#[test]
fn greater_than_keeps_larger_estimates() {
    let ws = Workspace::new()
        .apply(Command::AddCustomField(estimate_field()), 1)
        .unwrap();
    let ws = add_task(ws, vec![("estimate", Value::Num(10.0))], 10);
    let ws = add_task(ws, vec![("estimate", Value::Num(3.0))], 11);
    let ws = add_task(ws, vec![("title", Value::from("no estimate"))], 12);

    let ws = ws
        .apply(
            Command::AddFilter(FilterInput::new("estimate", "greater_than", "5")),
            13,
        )
        .unwrap();
    assert_eq!(ids(&ws.visible_tasks()), vec![10]);
}

#[test]
fn set_sort_toggles_direction() {
    // Sorted ascending by another key first.
    let ws = Workspace::new()
        .apply(Command::SetSort("status".into()), 1)
        .unwrap();
    assert_eq!(ws.sort().sort_order, SortOrder::Asc);

    let ws = ws.apply(Command::SetSort("title".into()), 2).unwrap();
    let ws = ws.apply(Command::SetSort("title".into()), 3).unwrap();
    assert_eq!(ws.sort().sort_by, "title");
    assert_eq!(ws.sort().sort_order, SortOrder::Desc);

    let ws = ws.apply(Command::SetSort("title".into()), 4).unwrap();
    assert_eq!(ws.sort().sort_order, SortOrder::Asc);
}

#[test]
fn set_sort_on_active_key_flips_immediately() {
    // The default key is title, so the first call already flips.
    let ws = Workspace::new()
        .apply(Command::SetCurrentPage(4), 1)
        .unwrap()
        .apply(Command::SetSort("title".into()), 2)
        .unwrap();
    assert_eq!(ws.sort().sort_order, SortOrder::Desc);
    assert_eq!(ws.view().current_page, 1);
}

#[test]
fn bulk_delete_removes_selected() {
    let mut ws = Workspace::new();
    for id in 1..=3 {
        ws = add_task(ws, vec![("title", Value::from(format!("t{}", id)))], id);
    }
    let ws = ws.apply(Command::BulkDeleteTasks(vec![1, 3]), 4).unwrap();
    let remaining: Vec<u64> = ws.tasks().iter().map(|t| t.id).collect();
    assert_eq!(remaining, vec![2]);
}

#[test]
fn bulk_update_sets_every_selected_task() {
    let mut ws = Workspace::new();
    for id in 1..=3 {
        ws = add_task(ws, vec![("status", Value::from("not_started"))], id);
    }
    let command: Command = serde_json::from_value(serde_json::json!({
        "type": "bulkUpdateTasks",
        "payload": {"taskIds": [1, 3, 99], "updateData": {"status": "completed"}}
    }))
    .unwrap();
    let ws = ws.apply(command, 4).unwrap();

    let statuses: Vec<String> = ws
        .tasks()
        .iter()
        .map(|t| t.get("status").unwrap().to_string())
        .collect();
    assert_eq!(statuses, vec!["completed", "not_started", "completed"]);
    assert_eq!(
        ws.tasks()[0].get("status"),
        Some(&Value::Choice("completed".into()))
    );
}

#[test]
fn request_count_field_discards_snapshot() {
    let blob = serde_json::json!({
        "tasks": [{"id": 1, "title": "kept?"}],
        "customFields": [
            {"name": "title", "label": "Task Title", "type": "text"},
            {"name": "request_count", "label": "Requests", "type": "number"}
        ],
        "activeFilters": [],
        "sortBy": "title",
        "sortOrder": "asc",
        "currentPage": 1,
        "pageSize": 10
    })
    .to_string();

    let restored = restore(Some(&blob));
    assert!(restored.discard_blob);
    assert_eq!(restored.workspace, Workspace::new());
}

#[test]
fn controller_session() {
    use taskgrid_engine::{Controller, MemoryStorage, Storage};

    let mut controller = Controller::start(MemoryStorage::new());
    controller
        .dispatch(Command::AddCustomField(estimate_field()), 1)
        .unwrap();
    for i in 0..25u64 {
        controller
            .dispatch(
                Command::AddTask(attributes([
                    ("title", Value::from(format!("task {:02}", i))),
                    ("estimate", Value::Num(i as f64)),
                ])),
                100 + i,
            )
            .unwrap();
    }
    controller.dispatch(Command::SetPageSize(20), 200).unwrap();
    controller.dispatch(Command::SetCurrentPage(2), 201).unwrap();

    let view = controller.view();
    assert_eq!(view.total_pages, 2);
    assert_eq!(view.tasks.len(), 5);

    let storage = controller.into_storage();
    assert!(storage.get(STORAGE_KEY).unwrap().is_some());

    let resumed = Controller::start(storage);
    assert_eq!(resumed.view(), view);
}

// ============================================================================
// Properties
// ============================================================================

fn arb_tasks() -> impl Strategy<Value = Vec<(String, Option<i32>, bool)>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["alpha", "Beta", "gamma", "delta", "", "Alpha"])
                .prop_map(String::from),
            prop::option::of(-20i32..20),
            any::<bool>(),
        ),
        0..40,
    )
}

fn arb_filter() -> impl Strategy<Value = Filter> {
    prop_oneof![
        (
            prop::sample::select(vec!["contains", "equals", "starts_with", "ends_with", "not_equals"]),
            prop::sample::select(vec!["a", "al", "BETA", "ta", ""]),
        )
            .prop_map(|(op, v)| Filter::new("title", op, v)),
        (
            prop::sample::select(vec![
                "equals",
                "greater_than",
                "less_than",
                "greater_equal",
                "less_equal",
                "bogus"
            ]),
            -20i32..20,
        )
            .prop_map(|(op, v)| Filter::new("estimate", op, v.to_string())),
        prop::sample::select(vec!["true", "false"]).prop_map(|v| Filter::new("done", "equals", v)),
    ]
}

fn build(rows: &[(String, Option<i32>, bool)]) -> Workspace {
    let mut ws = Workspace::new()
        .apply(Command::AddCustomField(estimate_field()), 1)
        .unwrap()
        .apply(
            Command::AddCustomField(CustomField::new("done", "Done", FieldType::Checkbox)),
            2,
        )
        .unwrap();
    for (i, (title, estimate, done)) in rows.iter().enumerate() {
        let mut pairs = vec![
            ("title", Value::from(title.as_str())),
            ("done", Value::Bool(*done)),
            ("priority", Value::from("medium")),
        ];
        if let Some(e) = estimate {
            pairs.push(("estimate", Value::from(*e)));
        }
        ws = add_task(ws, pairs, 1000 + i as u64);
    }
    ws
}

proptest! {
    #[test]
    fn prop_add_field_backfills(rows in arb_tasks(), kind in 0usize..3) {
        let ws = build(&rows);
        let (field_type, zero) = match kind {
            0 => (FieldType::Text, Value::from("")),
            1 => (FieldType::Number, Value::Num(0.0)),
            _ => (FieldType::Checkbox, Value::Bool(false)),
        };

        let next = ws
            .apply(Command::AddCustomField(CustomField::new("extra", "Extra", field_type)), 5000)
            .unwrap();
        prop_assert_eq!(next.schema().len(), ws.schema().len() + 1);
        for task in next.tasks() {
            prop_assert_eq!(task.get("extra"), Some(&zero));
        }

        // The same name in any case is rejected and changes nothing.
        for name in ["extra", "EXTRA", "Extra"] {
            let dup = CustomField::new(name, "Again", FieldType::Text);
            prop_assert!(next.apply(Command::AddCustomField(dup), 5001).is_err());
        }
    }

    #[test]
    fn prop_permanent_fields_survive(rows in arb_tasks(), which in 0usize..3) {
        let ws = build(&rows);
        let name = ["title", "priority", "status"][which];
        let next = ws.apply(Command::RemoveCustomField(name.into()), 5000).unwrap();
        prop_assert_eq!(next.schema().len(), ws.schema().len());
        prop_assert_eq!(next, ws);
    }

    #[test]
    fn prop_filters_compose_with_and(
        rows in arb_tasks(),
        filters in prop::collection::vec(arb_filter(), 0..4),
    ) {
        let ws = build(&rows);
        for task in ws.tasks() {
            let combined = evaluate(task, &filters, ws.schema());
            let each = filters.iter().all(|f| evaluate(task, [f], ws.schema()));
            prop_assert_eq!(combined, each);
        }
    }

    #[test]
    fn prop_sort_directions_mirror(rows in arb_tasks(), field in prop::sample::select(vec!["estimate", "title", "done", "priority"])) {
        let ws = build(&rows);
        let mut asc: Vec<&Task> = ws.tasks().iter().collect();
        sort_tasks(&mut asc, field, SortOrder::Asc, ws.schema());
        let mut desc: Vec<&Task> = ws.tasks().iter().collect();
        sort_tasks(&mut desc, field, SortOrder::Desc, ws.schema());

        let mut reversed = ids(&asc);
        reversed.reverse();
        prop_assert_eq!(ids(&desc), reversed);
    }

    #[test]
    fn prop_pages_reconstruct_sequence(
        rows in arb_tasks(),
        size in prop::sample::select(vec![10u32, 20, 50]),
        filter in prop::option::of(arb_filter()),
    ) {
        let mut ws = build(&rows);
        if let Some(f) = filter {
            let input = FilterInput::new(f.field, f.operator, f.value);
            ws = ws.apply(Command::AddFilter(input), 5000).unwrap();
        }
        let visible = ws.visible_tasks();
        let size = PageSize::new(size).unwrap();

        let mut rebuilt = Vec::new();
        for page in 1..=total_pages(visible.len(), size) {
            let slice = paginate(&visible, page, size);
            prop_assert!(!slice.is_empty());
            rebuilt.extend(slice.iter().map(|t| t.id));
        }
        prop_assert_eq!(rebuilt, ids(&visible));
    }

    #[test]
    fn prop_snapshot_round_trip(
        rows in arb_tasks(),
        filter in prop::option::of(arb_filter()),
        sort_field in prop::sample::select(vec!["title", "estimate", "done"]),
        size in prop::sample::select(vec![10u32, 20, 50]),
    ) {
        let mut ws = build(&rows)
            .apply(Command::SetSort(sort_field.into()), 6000)
            .unwrap()
            .apply(Command::SetPageSize(size), 6001)
            .unwrap();
        if let Some(f) = filter {
            let input = FilterInput::new(f.field, f.operator, f.value);
            ws = ws.apply(Command::AddFilter(input), 6002).unwrap();
        }

        match sanitize_for_save(&ws) {
            Some(snapshot) => {
                let restored = restore(Some(&snapshot.to_json().unwrap()));
                prop_assert!(!restored.discard_blob);
                prop_assert_eq!(restored.workspace, ws);
            }
            None => prop_assert!(ws.tasks().is_empty()),
        }
    }
}
