use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::Vec2;
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use weft_core::{Node, Value, View, ViewId};
use weft_runtime::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Tree,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "weft-render")]
#[command(about = "Renders a Weft template headlessly and prints the laid-out view tree")]
struct Args {
    /// Template JSON file
    template: PathBuf,

    /// View-model JSON file
    #[arg(long)]
    model: Option<PathBuf>,

    #[arg(long, default_value_t = 800.0)]
    width: f32,

    #[arg(long, default_value_t = 600.0)]
    height: f32,

    #[arg(long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Write the output to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Include frames in tree output
    #[arg(long)]
    show_layout: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let source = fs::read_to_string(&args.template)
        .with_context(|| format!("Failed to read template: {}", args.template.display()))?;
    let template = Node::from_json(&source)
        .with_context(|| format!("Invalid template: {}", args.template.display()))?;

    let model = match &args.model {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("Failed to read model: {}", path.display()))?;
            let json: serde_json::Value = serde_json::from_str(&source)
                .with_context(|| format!("Invalid model JSON: {}", path.display()))?;
            Value::from(json)
        }
        None => {
            debug!("No model given; rendering against an empty one");
            Value::map::<&str, _>([])
        }
    };

    let mut screen = Screen::new(template, model);
    let root = screen
        .render(args.width, args.height)
        .context("Render failed")?;
    info!("Rendered {} views", screen.tree().len());

    let output = match args.format {
        Format::Tree => tree_output(&screen, root, args.show_layout),
        Format::Json => serde_json::to_string_pretty(&json_output(&screen, root))
            .context("Failed to serialize view tree")?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &output)
                .with_context(|| format!("Failed to write to file: {}", path.display()))?;
            info!("Output written to: {}", path.display());
        }
        None => println!("{}", output),
    }
    Ok(())
}

/// Children of `view` for printing: its subviews, or its materialized rows for a list.
fn printed_children(screen: &Screen, view: &View) -> Vec<ViewId> {
    match screen.renderer().list(view.id) {
        Some(list) => list.cells().map(|(_, cell)| cell.root).collect(),
        None => view.subviews.clone(),
    }
}

fn describe(view: &View, show_layout: bool) -> String {
    let mut line = format!("{:?}", view.kind);
    if let Some(id) = &view.style.data_id {
        line.push_str(&format!(" #{}", id));
    }
    if let Some(text) = view.style.text.as_deref().filter(|text| !text.is_empty()) {
        line.push_str(&format!(" \"{}\"", text));
    }
    if show_layout {
        let frame = view.frame;
        line.push_str(&format!(
            " pos:({:.0},{:.0}) size:({:.0},{:.0})",
            frame.origin.x, frame.origin.y, frame.size.x, frame.size.y
        ));
    }
    line
}

fn tree_output(screen: &Screen, root: ViewId, show_layout: bool) -> String {
    let mut lines = Vec::new();
    write_tree(screen, root, "", true, true, show_layout, &mut lines);
    lines.join("\n")
}

fn write_tree(
    screen: &Screen,
    id: ViewId,
    prefix: &str,
    is_root: bool,
    is_last: bool,
    show_layout: bool,
    lines: &mut Vec<String>,
) {
    let Some(view) = screen.tree().view(id) else {
        return;
    };
    let branch = match (is_root, is_last) {
        (true, _) => "",
        (false, true) => "└── ",
        (false, false) => "├── ",
    };
    lines.push(format!("{}{}{}", prefix, branch, describe(view, show_layout)));

    let child_prefix = match (is_root, is_last) {
        (true, _) => String::new(),
        (false, true) => format!("{}    ", prefix),
        (false, false) => format!("{}│   ", prefix),
    };
    let children = printed_children(screen, view);
    let count = children.len();
    for (position, child) in children.into_iter().enumerate() {
        write_tree(
            screen,
            child,
            &child_prefix,
            false,
            position + 1 == count,
            show_layout,
            lines,
        );
    }
}

fn json_output(screen: &Screen, id: ViewId) -> serde_json::Value {
    let Some(view) = screen.tree().view(id) else {
        return serde_json::Value::Null;
    };
    let frame = view.frame;
    let children: Vec<serde_json::Value> = printed_children(screen, view)
        .into_iter()
        .map(|child| json_output(screen, child))
        .collect();

    let mut node = json!({
        "view": view.id,
        "kind": format!("{:?}", view.kind),
        "frame": [frame.origin.x, frame.origin.y, frame.size.x, frame.size.y],
        "children": children,
    });
    if let Some(text) = &view.style.text {
        node["text"] = json!(text);
    }
    if let Some(id) = &view.style.data_id {
        node["id"] = json!(id);
    }
    if view.content_size != Vec2::ZERO {
        node["contentSize"] = json!([view.content_size.x, view.content_size.y]);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::NodeKind;

    fn screen() -> (Screen, ViewId) {
        let template = Node::new(NodeKind::Container)
            .child(Node::new(NodeKind::Text).attr("text", "{{greeting}}"))
            .child(Node::new(NodeKind::Button).attr("id", "go"));
        let mut screen = Screen::new(
            template,
            Value::map([("greeting", Value::from("Hello"))]),
        );
        let root = screen.render(200.0, 100.0).unwrap();
        (screen, root)
    }

    #[test]
    fn tree_output_draws_branches() {
        let (screen, root) = screen();
        let output = tree_output(&screen, root, false);
        assert_eq!(
            output,
            "Container\n├── Text \"Hello\"\n└── Button #go"
        );
    }

    #[test]
    fn tree_output_can_show_frames() {
        let (screen, root) = screen();
        let output = tree_output(&screen, root, true);
        assert!(output.starts_with("Container pos:(0,0) size:(200,100)"));
    }

    #[test]
    fn json_output_nests_children() {
        let (screen, root) = screen();
        let json = json_output(&screen, root);
        assert_eq!(json["kind"], "Container");
        assert_eq!(json["children"][0]["text"], "Hello");
        assert_eq!(json["children"][1]["id"], "go");
        assert_eq!(json["frame"][2], 200.0);
    }
}
