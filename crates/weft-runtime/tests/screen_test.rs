// crates/weft-runtime/tests/screen_test.rs
mod common;

use common::{item, list_screen};
use weft_core::{ControlValue, DataPath, Node, Value};
use weft_runtime::{EventOutcome, RenderRequest, Screen, UIEvent};

fn profile() -> Screen {
    let template = Node::tag("container")
        .child(
            Node::tag("input")
                .attr("id", "name")
                .attr("text", "{{user.name}}")
                .attr("onChange", "greeting = 'Hi ' + value"),
        )
        .child(
            Node::tag("switch")
                .attr("id", "notify")
                .attr("value", "{{user.notify}}"),
        )
        .child(
            Node::tag("slider")
                .attr("id", "volume")
                .attr("value", "Volume {{user.volume}}"),
        )
        .child(
            Node::tag("text")
                .attr("id", "summary")
                .attr("text", "{{user.name}} / {{greeting}}"),
        );
    let model = Value::map([
        (
            "user",
            Value::map([
                ("name", Value::from("")),
                ("notify", Value::from(false)),
                ("volume", Value::from(3)),
            ]),
        ),
        ("greeting", Value::from("")),
    ]);
    Screen::new(template, model)
}

fn read(screen: &Screen, expr: &str) -> Value {
    screen.evaluate(expr)
}

#[test]
fn test_two_way_text_binding_updates_model_and_runs_on_change() {
    let mut screen = profile();
    screen.render(320.0, 480.0).unwrap();
    let input = screen.find_view("name").unwrap();

    let outcome = screen.handle_event(UIEvent::TextChanged(input, "Ada".into()));
    assert_eq!(outcome, EventOutcome::Handled);
    assert_eq!(read(&screen, "user.name"), Value::from("Ada"));
    assert_eq!(read(&screen, "greeting"), Value::from("Hi Ada"));

    let style = &screen.tree().view(input).unwrap().style;
    assert_eq!(style.text.as_deref(), Some("Ada"));
    assert_eq!(style.value, Some(ControlValue::Text("Ada".into())));
}

#[test]
fn test_switch_binding_writes_booleans() {
    let mut screen = profile();
    screen.render(320.0, 480.0).unwrap();
    let switch = screen.find_view("notify").unwrap();

    screen.handle_event(UIEvent::Toggled(switch, true));
    assert_eq!(read(&screen, "user.notify"), Value::from(true));
}

#[test]
fn test_mixed_value_attribute_is_one_way() {
    let mut screen = profile();
    screen.render(320.0, 480.0).unwrap();
    let slider = screen.find_view("volume").unwrap();
    assert!(screen
        .renderer()
        .binding(slider)
        .map_or(true, |binding| binding.two_way.is_none()));

    screen.handle_event(UIEvent::SliderChanged(slider, 7.0));
    assert_eq!(read(&screen, "user.volume"), Value::from(3));
}

#[test]
fn test_model_changes_show_after_a_render_request() {
    let mut screen = profile();
    screen.render(320.0, 480.0).unwrap();
    let input = screen.find_view("name").unwrap();
    screen.handle_event(UIEvent::TextChanged(input, "Ada".into()));

    // Changing a value does not re-render by itself.
    let summary = screen.find_view("summary").unwrap();
    assert_eq!(
        screen.tree().view(summary).unwrap().style.text.as_deref(),
        Some(" / ")
    );

    screen.evaluate("render()");
    assert_eq!(screen.process_render_requests(), Some(RenderRequest::Full));
    let summary = screen.find_view("summary").unwrap();
    assert_eq!(
        screen.tree().view(summary).unwrap().style.text.as_deref(),
        Some("Ada / Hi Ada")
    );
}

fn inbox() -> Screen {
    let model = Value::map([
        ("items", Value::List(vec![item("a", "Ada"), item("b", "Bob")])),
        ("selected", Value::from("")),
        ("pressed", Value::from("")),
        ("refreshes", Value::from(0)),
    ]);
    Screen::new(list_screen("300"), model)
}

#[test]
fn test_reload_lists_refreshes_rows_without_rebuilding() {
    let mut screen = inbox();
    let root = screen.render(320.0, 480.0).unwrap();
    let list = screen.find_view("list").unwrap();

    screen
        .model()
        .borrow_mut()
        .set_path(
            &DataPath::root().key("items"),
            Value::List(vec![item("b", "Bob"), item("c", "Cy"), item("a", "Ada")]),
        )
        .unwrap();
    screen.evaluate("reloadLists()");
    assert_eq!(screen.process_render_requests(), Some(RenderRequest::Lists));

    assert_eq!(screen.root(), Some(root));
    assert_eq!(screen.find_view("list"), Some(list));
    let view = screen.renderer().list(list).unwrap();
    assert_eq!(view.items().len(), 3);
    assert_eq!(view.last_diff().insertions.len(), 1);
    assert_eq!(view.last_diff().moves.len(), 1);
}

#[test]
fn test_full_render_request_wins_over_list_reload() {
    let mut screen = inbox();
    screen.render(320.0, 480.0).unwrap();

    screen.evaluate("reloadLists(); render(); reloadLists()");
    assert_eq!(screen.process_render_requests(), Some(RenderRequest::Full));
    assert_eq!(screen.process_render_requests(), None);
}

#[test]
fn test_row_handler_can_request_a_render() {
    let template = Node::tag("container")
        .child(Node::tag("text").attr("id", "title").attr("text", "{{selected}}"))
        .child(
            Node::tag("list")
                .attr("id", "list")
                .attr("height", "300")
                .attr("data", "{{items}}")
                .attr("onItemClick", "selected = item.name; render()")
                .child(
                    Node::tag("template")
                        .child(Node::tag("text").attr("text", "{{item.name}}")),
                ),
        );
    let model = Value::map([
        ("items", Value::List(vec![item("a", "Ada"), item("b", "Bob")])),
        ("selected", Value::from("none")),
    ]);
    let mut screen = Screen::new(template, model);
    screen.render(320.0, 480.0).unwrap();
    let list = screen.find_view("list").unwrap();

    let outcome = screen.handle_event(UIEvent::ListTapped {
        list,
        point: glam::Vec2::new(10.0, 100.0),
    });
    assert_eq!(outcome, EventOutcome::RowSelected { list, index: 1 });

    let title = screen.find_view("title").unwrap();
    assert_eq!(
        screen.tree().view(title).unwrap().style.text.as_deref(),
        Some("Bob")
    );
}
