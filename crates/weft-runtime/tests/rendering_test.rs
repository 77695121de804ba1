// crates/weft-runtime/tests/rendering_test.rs
mod common;

use std::collections::HashSet;

use common::{item, list_screen, renderer_with, root_scope, text_of, BackendCall, RecordingBackend};
use weft_core::{Node, Value, ViewKind};
use weft_layout::CleanupReport;

fn todos() -> Value {
    Value::map([
        ("title", Value::from("Inbox")),
        ("show", Value::from(false)),
        (
            "todos",
            Value::List(vec![
                Value::map([("title", Value::from("Write")), ("done", Value::from(true))]),
                Value::map([("title", Value::from("Test")), ("done", Value::from(false))]),
                Value::map([("title", Value::from("Ship")), ("done", Value::from(false))]),
            ]),
        ),
    ])
}

#[test]
fn test_false_condition_renders_nothing() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(todos());

    let template = Node::tag("container")
        .child(Node::tag("text").when("{{show}}").attr("text", "hidden"))
        .child(Node::tag("text").when("!show").attr("text", "shown"));
    let root = renderer.render_root(&template, &scope, 320.0, 480.0).unwrap();

    let subviews = &renderer.tree().view(root).unwrap().subviews;
    assert_eq!(subviews.len(), 1);
    assert_eq!(text_of(&renderer, subviews[0]).as_deref(), Some("shown"));
}

#[test]
fn test_repeat_renders_one_view_per_item() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(todos());

    let template = Node::tag("container").child(
        Node::tag("text")
            .repeat("todo in todos")
            .unwrap()
            .attr("text", "{{index + 1}}. {{todo.title}} ({{title}})"),
    );
    let root = renderer.render_root(&template, &scope, 320.0, 480.0).unwrap();

    let labels: Vec<String> = renderer
        .tree()
        .view(root)
        .unwrap()
        .subviews
        .iter()
        .filter_map(|view| text_of(&renderer, *view))
        .collect();
    assert_eq!(
        labels,
        vec!["1. Write (Inbox)", "2. Test (Inbox)", "3. Ship (Inbox)"]
    );
}

#[test]
fn test_condition_gates_the_whole_repeat() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(todos());

    let repeated = |condition: &str| {
        Node::tag("text")
            .repeat("todo in todos")
            .unwrap()
            .when(condition)
            .attr("text", "{{todo.title}}")
    };
    assert!(renderer.render(&repeated("show"), &scope).is_empty());
    assert_eq!(renderer.render(&repeated("!show"), &scope).len(), 3);
}

#[test]
fn test_count_condition_toggles_rendering() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let badge = Node::tag("text").when("count > 0").attr("text", "{{count}} new");

    let empty = root_scope(Value::map([("count", Value::from(0))]));
    assert!(renderer.render(&badge, &empty).is_empty());
    assert_eq!(renderer.tree().len(), 0);
    assert_eq!(renderer.tree().live_layout_nodes(), 0);

    let one = root_scope(Value::map([("count", Value::from(1))]));
    let views = renderer.render(&badge, &one);
    assert_eq!(views.len(), 1);
    assert_eq!(text_of(&renderer, views[0]).as_deref(), Some("1 new"));
}

#[test]
fn test_multiple_interpolations_in_one_attribute() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(Value::map([("a", Value::from("x")), ("b", Value::from("y"))]));

    let template = Node::tag("text").attr("text", "{{a}} and {{b}}");
    let root = renderer.render_root(&template, &scope, 200.0, 100.0).unwrap();
    assert_eq!(text_of(&renderer, root).as_deref(), Some("x and y"));
}

#[test]
fn test_failed_interpolation_renders_empty() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(todos());

    let template = Node::tag("text").attr("text", "[{{missing.deeply}}]{{title}}");
    let root = renderer.render_root(&template, &scope, 100.0, 100.0).unwrap();
    assert_eq!(text_of(&renderer, root).as_deref(), Some("[]Inbox"));
}

#[test]
fn test_unknown_kind_degrades_to_visible_fallback() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(todos());

    let template = Node::tag("container")
        .child(Node::tag("sparkline"))
        .child(Node::tag("text").attr("text", "{{title}}"));
    let root = renderer.render_root(&template, &scope, 200.0, 200.0).unwrap();

    let subviews = renderer.tree().view(root).unwrap().subviews.clone();
    assert_eq!(subviews.len(), 2);
    let fallback = renderer.tree().view(subviews[0]).unwrap();
    assert_eq!(fallback.kind, ViewKind::Fallback);
    assert!(fallback.frame.size.y >= 44.0);
    assert_eq!(text_of(&renderer, subviews[1]).as_deref(), Some("Inbox"));
}

#[test]
fn test_frames_match_computed_layout() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(todos());

    let template = Node::tag("container")
        .attr("padding", "12")
        .child(
            Node::tag("container")
                .attr("flexDirection", "row")
                .attr("height", "50")
                .child(Node::tag("container").attr("flex", "1"))
                .child(Node::tag("container").attr("width", "30%")),
        )
        .child(
            Node::tag("text")
                .repeat("todo in todos")
                .unwrap()
                .attr("text", "{{todo.title}}"),
        );
    renderer.render_root(&template, &scope, 400.0, 600.0).unwrap();

    let tree = renderer.tree();
    assert!(tree.len() > 5);
    for view in tree.views() {
        assert_eq!(Some(view.frame), tree.computed_frame(view.id), "view {}", view.id);
    }
}

#[test]
fn test_cleanup_is_idempotent_and_releases_every_view_once() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(Value::map([(
        "items",
        Value::List(vec![item("a", "A"), item("b", "B")]),
    )]));

    renderer
        .render_root(&list_screen("300"), &scope, 320.0, 480.0)
        .unwrap();
    let live = renderer.tree().len();
    assert!(live > 0);

    let report = renderer.cleanup();
    assert_eq!(report.freed, live);
    assert_eq!(renderer.cleanup(), CleanupReport::default());
    assert_eq!(renderer.tree().live_layout_nodes(), 0);

    let calls = backend.calls();
    let created: HashSet<u32> = calls
        .iter()
        .filter_map(|call| match call {
            BackendCall::Created(view, _) => Some(*view),
            _ => None,
        })
        .collect();
    let released: Vec<u32> = calls
        .iter()
        .filter_map(|call| match call {
            BackendCall::Released(view) => Some(*view),
            _ => None,
        })
        .collect();
    let unique: HashSet<u32> = released.iter().copied().collect();
    assert_eq!(unique.len(), released.len(), "a view was released twice");
    assert_eq!(unique, created);
}

#[test]
fn test_rerender_starts_from_an_empty_tree() {
    let backend = RecordingBackend::default();
    let mut renderer = renderer_with(&backend);
    let scope = root_scope(todos());
    let template = Node::tag("container").child(
        Node::tag("text")
            .repeat("todo in todos")
            .unwrap()
            .attr("text", "{{todo.title}}"),
    );

    renderer.render_root(&template, &scope, 320.0, 480.0).unwrap();
    let first = renderer.tree().len();
    renderer.render_root(&template, &scope, 320.0, 480.0).unwrap();
    assert_eq!(renderer.tree().len(), first);
    assert_eq!(renderer.tree().roots().len(), 1);
}
