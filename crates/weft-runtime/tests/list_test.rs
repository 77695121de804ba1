// crates/weft-runtime/tests/list_test.rs
mod common;

use std::collections::BTreeSet;

use common::{item, list_screen, renderer_with, root_scope, text_of, RecordingBackend};
use glam::Vec2;
use weft_core::{DataPath, Node, Value, ViewId};
use weft_layout::BatchOp;
use weft_runtime::list::{Insertion, Removal};
use weft_runtime::{EventOutcome, Renderer, Scope, UIEvent};

fn numbered(ids: &[i32]) -> Value {
    Value::List(
        ids.iter()
            .map(|id| Value::map([("id", Value::from(*id)), ("name", Value::from(format!("#{}", id)))]))
            .collect(),
    )
}

fn model(items: Value) -> Value {
    Value::map([
        ("items", items),
        ("selected", Value::from("")),
        ("pressed", Value::from("")),
        ("refreshes", Value::from(0)),
    ])
}

fn list_id(renderer: &Renderer) -> ViewId {
    renderer.tree().find_by_data_id("list").unwrap()
}

fn set_items(scope: &Scope, items: Value) {
    scope.write(&DataPath::root().key("items"), items).unwrap();
}

fn cell_text(renderer: &Renderer, list: ViewId, row: usize) -> Option<String> {
    let cell = renderer.list(list)?.cell(row)?;
    renderer
        .tree()
        .descendants(cell.root)
        .into_iter()
        .find_map(|view| text_of(renderer, view))
}

#[test]
fn test_keyed_diff_reaches_the_backend() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(model(numbered(&[1, 2, 3])));
    renderer
        .render_root(&list_screen("400"), &scope, 320.0, 480.0)
        .unwrap();
    assert_eq!(
        backend.batches(),
        vec![(
            vec![
                BatchOp::Insert { index: 0 },
                BatchOp::Insert { index: 1 },
                BatchOp::Insert { index: 2 },
            ],
            false
        )]
    );
    backend.clear();

    set_items(&scope, numbered(&[2, 3, 4]));
    renderer.refresh_lists();

    let list = renderer.list(list_id(&renderer)).unwrap();
    let ids: Vec<&str> = list.items().iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3", "4"]);
    assert_eq!(
        list.last_diff().removals,
        vec![Removal {
            index: 0,
            id: "1".into()
        }]
    );
    assert_eq!(
        list.last_diff().insertions,
        vec![Insertion {
            index: 2,
            id: "4".into()
        }]
    );
    assert!(list.last_diff().moves.is_empty());
    assert_eq!(
        backend.batches(),
        vec![(
            vec![BatchOp::Delete { index: 0 }, BatchOp::Insert { index: 2 }],
            true
        )]
    );
}

#[test]
fn test_unchanged_data_sends_no_batch() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(model(numbered(&[1, 2])));
    renderer
        .render_root(&list_screen("400"), &scope, 320.0, 480.0)
        .unwrap();
    backend.clear();

    renderer.refresh_lists();
    assert!(backend.batches().is_empty());
    assert!(renderer.list(list_id(&renderer)).unwrap().last_diff().is_empty());
}

#[test]
fn test_cells_show_their_items() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(model(Value::List(vec![item("a", "Ada"), item("b", "Bob")])));
    renderer
        .render_root(&list_screen("400"), &scope, 320.0, 480.0)
        .unwrap();

    let list = list_id(&renderer);
    assert_eq!(cell_text(&renderer, list, 0).as_deref(), Some("Ada"));
    assert_eq!(cell_text(&renderer, list, 1).as_deref(), Some("Bob"));

    let second = renderer.list(list).unwrap().cell(1).unwrap().root;
    let frame = renderer.tree().view(second).unwrap().frame;
    assert_eq!(frame.origin, Vec2::new(0.0, 90.0));
    assert_eq!(frame.size, Vec2::new(320.0, 80.0));
}

#[test]
fn test_tap_on_control_does_not_select_row() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(model(Value::List(vec![item("a", "Ada"), item("b", "Bob")])));
    renderer
        .render_root(&list_screen("400"), &scope, 320.0, 480.0)
        .unwrap();
    let list = list_id(&renderer);

    // The button sits on the trailing 60 points of the row's top 40.
    let outcome = renderer.dispatch(UIEvent::ListTapped {
        list,
        point: Vec2::new(290.0, 20.0),
    });
    let EventOutcome::ControlHit { view, .. } = outcome else {
        panic!("expected a control hit, got {:?}", outcome);
    };
    assert_eq!(scope.lookup("selected"), Some(Value::from("")));

    assert_eq!(renderer.dispatch(UIEvent::Clicked(view)), EventOutcome::Handled);
    assert_eq!(scope.lookup("pressed"), Some(Value::from("Ada")));
}

#[test]
fn test_tap_on_row_selects_it_in_the_item_scope() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(model(Value::List(vec![item("a", "Ada"), item("b", "Bob")])));
    renderer
        .render_root(&list_screen("400"), &scope, 320.0, 480.0)
        .unwrap();
    let list = list_id(&renderer);

    assert_eq!(
        renderer.dispatch(UIEvent::ListTapped {
            list,
            point: Vec2::new(100.0, 130.0),
        }),
        EventOutcome::RowSelected { list, index: 1 }
    );
    assert_eq!(scope.lookup("selected"), Some(Value::from("Bob")));

    // The gap between rows belongs to no row.
    assert_eq!(
        renderer.dispatch(UIEvent::ListTapped {
            list,
            point: Vec2::new(100.0, 85.0),
        }),
        EventOutcome::Ignored
    );
}

#[test]
fn test_scrolling_reuses_cells() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let ids: Vec<i32> = (0..20).collect();
    let scope = root_scope(model(numbered(&ids)));
    renderer
        .render_root(&list_screen("200"), &scope, 320.0, 480.0)
        .unwrap();
    let list = list_id(&renderer);

    let roots = |renderer: &Renderer| -> BTreeSet<ViewId> {
        renderer
            .list(list)
            .unwrap()
            .cells()
            .map(|(_, cell)| cell.root)
            .collect()
    };
    let rows = |renderer: &Renderer| -> Vec<usize> {
        renderer.list(list).unwrap().cells().map(|(row, _)| row).collect()
    };

    assert_eq!(rows(&renderer), vec![0, 1, 2]);
    assert_eq!(
        renderer.tree().view(list).unwrap().content_size,
        Vec2::new(320.0, 20.0 * 80.0 + 19.0 * 10.0)
    );
    let before = roots(&renderer);
    let views_before = renderer.tree().len();

    assert_eq!(
        renderer.dispatch(UIEvent::Scrolled {
            view: list,
            offset: 900.0
        }),
        EventOutcome::Handled
    );
    assert_eq!(rows(&renderer), vec![10, 11, 12]);
    assert_eq!(roots(&renderer), before);
    assert_eq!(renderer.list(list).unwrap().pooled(), 0);
    assert_eq!(renderer.tree().len(), views_before);
    assert_eq!(cell_text(&renderer, list, 10).as_deref(), Some("#10"));

    // Past the end clamps to the last full viewport.
    renderer.dispatch(UIEvent::Scrolled {
        view: list,
        offset: 10_000.0,
    });
    assert_eq!(renderer.list(list).unwrap().offset(), 1790.0 - 200.0);
    assert_eq!(rows(&renderer), vec![17, 18, 19]);
}

#[test]
fn test_pull_to_refresh_runs_until_the_next_reload() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(model(numbered(&[1])));
    renderer
        .render_root(&list_screen("200"), &scope, 320.0, 480.0)
        .unwrap();
    let list = list_id(&renderer);

    assert_eq!(
        renderer.dispatch(UIEvent::PullToRefresh(list)),
        EventOutcome::Handled
    );
    assert!(renderer.list(list).unwrap().is_refreshing());
    assert_eq!(scope.lookup("refreshes"), Some(Value::from(1)));

    renderer.refresh_lists();
    assert!(!renderer.list(list).unwrap().is_refreshing());
}

#[test]
fn test_template_types_and_default_cell() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(Value::map([(
        "feed",
        Value::List(vec![
            Value::map([("id", Value::from("h")), ("type", Value::from("header")), ("title", Value::from("Today"))]),
            Value::map([("id", Value::from("p")), ("title", Value::from("Post"))]),
        ]),
    )]));
    let template = Node::tag("list")
        .attr("id", "list")
        .attr("data", "feed")
        .child(
            Node::tag("template")
                .attr("type", "header")
                .child(Node::tag("text").attr("text", "== {{item.title}} ==")),
        )
        .child(
            Node::tag("template")
                .attr("type", "item")
                .child(Node::tag("text").attr("text", "{{index}}: {{item.title}}")),
        );
    renderer.render_root(&template, &scope, 320.0, 480.0).unwrap();
    let list = list_id(&renderer);

    let view = renderer.list(list).unwrap();
    assert_eq!(view.template_types(), vec!["header", "item"]);
    assert_eq!(view.cell(0).unwrap().template_type, "header");
    assert_eq!(cell_text(&renderer, list, 0).as_deref(), Some("== Today =="));
    assert_eq!(cell_text(&renderer, list, 1).as_deref(), Some("1: Post"));

    // Without any matching template every row gets the default cell.
    let bare = Node::tag("list").attr("id", "list").attr("data", "{{feed}}");
    renderer.render_root(&bare, &scope, 320.0, 480.0).unwrap();
    let list = list_id(&renderer);
    assert_eq!(cell_text(&renderer, list, 1).as_deref(), Some("Item 1 (Default)"));
}

#[test]
fn test_non_list_data_renders_no_rows() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(model(Value::from("not a list")));
    renderer
        .render_root(&list_screen("200"), &scope, 320.0, 480.0)
        .unwrap();
    let list = renderer.list(list_id(&renderer)).unwrap();
    assert!(list.items().is_empty());
    assert_eq!(list.cells().count(), 0);
    assert!(backend.batches().is_empty());
}

#[test]
fn test_duplicate_ids_are_dropped() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(model(Value::List(vec![
        item("a", "first"),
        item("a", "second"),
        item("b", "third"),
    ])));
    renderer
        .render_root(&list_screen("400"), &scope, 320.0, 480.0)
        .unwrap();
    let list = list_id(&renderer);

    let items = renderer.list(list).unwrap().items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].index, 2);
    // Row 1 is bound to the third data element, not the second.
    assert_eq!(cell_text(&renderer, list, 1).as_deref(), Some("third"));
}
