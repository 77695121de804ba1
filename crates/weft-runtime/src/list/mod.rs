// crates/weft-runtime/src/list/mod.rs
//! Data-driven, recycling list views.
//!
//! A list keeps a projected snapshot of its data source. Only slots inside the viewport are
//! materialized; each one is an independent cell root laid out at a fixed slot size and
//! returned to a per-template reuse pool when it scrolls out.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Range;

use glam::Vec2;
use tracing::{debug, warn};
use weft_core::{
    format_number, parse_bool, parse_number, Attributes, DataPath, Edges, Frame, Node, Value,
    ViewId,
};

use crate::config::RenderConfig;
use crate::scope::Scope;
use crate::template_engine::sole_binding;

mod cells;
pub mod diff;

pub use diff::{diff_ids, Insertion, ListDiff, Move, Removal};

/// Fields consulted, in order, for an item's template type.
const TEMPLATE_TYPE_FIELDS: [&str; 4] = ["templateType", "type", "cellType", "template"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

/// One row of a list snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: String,
    pub template_type: String,
    /// Position in the data source, which can differ from the row when duplicates are dropped.
    pub index: usize,
    pub data: Value,
}

/// A materialized slot.
#[derive(Debug, Clone)]
pub struct Cell {
    pub root: ViewId,
    pub template_type: String,
    pub item_id: String,
    pub(crate) scope: Scope,
}

/// Turns raw data into rows: stable ids, template types, duplicates dropped.
///
/// Items without an `id` get a random one, so they never match across snapshots.
pub fn project_items(payloads: &[Value], default_template_type: &str) -> Vec<ListItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(payloads.len());

    for (index, data) in payloads.iter().enumerate() {
        let id = item_id(data).unwrap_or_else(|| {
            debug!("List item {} has no id; assigning a random one", index);
            uuid::Uuid::new_v4().to_string()
        });
        if !seen.insert(id.clone()) {
            warn!("Duplicate list item id '{}' at index {}; dropping it", id, index);
            continue;
        }
        let template_type = TEMPLATE_TYPE_FIELDS
            .iter()
            .find_map(|field| data.get(field).and_then(Value::as_str))
            .unwrap_or(default_template_type)
            .to_string();
        items.push(ListItem {
            id,
            template_type,
            index,
            data: data.clone(),
        });
    }
    items
}

fn item_id(data: &Value) -> Option<String> {
    match data.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(n) => Some(format_number(*n)),
        _ => None,
    }
}

pub struct ListView {
    pub(crate) view: ViewId,
    pub(crate) data_expr: Option<String>,
    pub(crate) data_path: Option<DataPath>,
    pub(crate) scope: Scope,
    templates: HashMap<String, Node>,
    pub(crate) default_template_type: String,
    pub(crate) on_item_click: Option<String>,
    pub(crate) on_refresh: Option<String>,
    pub(crate) refreshing: bool,
    pub(crate) axis: Axis,
    pub(crate) item_extent: f32,
    pub(crate) spacing: f32,
    pub(crate) insets: Edges<f32>,
    pub(crate) offset: f32,
    pub(crate) items: Vec<ListItem>,
    pub(crate) cells: BTreeMap<usize, Cell>,
    reuse_pool: HashMap<String, Vec<ViewId>>,
    pub(crate) last_diff: ListDiff,
}

impl ListView {
    /// `raw` are the node's attributes as written, `resolved` after interpolation. The data
    /// source is read from `raw` since it names a path rather than a value.
    pub fn from_attributes(
        view: ViewId,
        raw: &Attributes,
        resolved: &Attributes,
        scope: Scope,
        config: &RenderConfig,
    ) -> Self {
        let data_expr = raw
            .get("data")
            .or_else(|| raw.get("dataSource"))
            .map(|source| sole_binding(source).unwrap_or(source.trim()).to_string())
            .filter(|source| !source.is_empty());

        let number = |key: &str| resolved.get(key).and_then(|v| parse_number(v));
        let padding = number("padding").unwrap_or(0.0);
        let insets = Edges {
            top: number("paddingTop").unwrap_or(padding),
            right: number("paddingRight").unwrap_or(padding),
            bottom: number("paddingBottom").unwrap_or(padding),
            left: number("paddingLeft").unwrap_or(padding),
        };

        let axis = match resolved.get("scrollDirection").map(String::as_str) {
            Some("horizontal") => Axis::Horizontal,
            _ => Axis::Vertical,
        };

        Self {
            view,
            data_expr,
            data_path: None,
            scope,
            templates: HashMap::new(),
            default_template_type: resolved
                .get("defaultTemplateType")
                .cloned()
                .unwrap_or_else(|| config.default_template_type.clone()),
            on_item_click: resolved.get("onItemClick").cloned(),
            on_refresh: resolved.get("onRefresh").cloned(),
            refreshing: resolved
                .get("refreshing")
                .and_then(|v| parse_bool(v))
                .unwrap_or(false),
            axis,
            item_extent: number("itemHeight")
                .or_else(|| number("itemSize"))
                .unwrap_or(config.list_item_extent),
            spacing: number("itemSpacing").unwrap_or(config.list_item_spacing),
            insets,
            offset: 0.0,
            items: Vec::new(),
            cells: BTreeMap::new(),
            reuse_pool: HashMap::new(),
            last_diff: ListDiff::default(),
        }
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Diff applied by the most recent refresh.
    pub fn last_diff(&self) -> &ListDiff {
        &self.last_diff
    }

    /// Materialized cells by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells.iter().map(|(row, cell)| (*row, cell))
    }

    pub fn cell(&self, row: usize) -> Option<&Cell> {
        self.cells.get(&row)
    }

    pub fn template_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub(crate) fn register_template(&mut self, template_type: String, node: Node) {
        if self.templates.contains_key(&template_type) {
            debug!("List {} replaces template '{}'", self.view, template_type);
        }
        self.templates.insert(template_type, node);
    }

    /// The template for `template_type`, falling back to the default type.
    pub(crate) fn template(&self, template_type: &str) -> Option<&Node> {
        self.templates
            .get(template_type)
            .or_else(|| self.templates.get(&self.default_template_type))
    }

    pub(crate) fn take_reusable(&mut self, template_type: &str) -> Option<ViewId> {
        self.reuse_pool.get_mut(template_type)?.pop()
    }

    pub(crate) fn pool(&mut self, template_type: String, root: ViewId) {
        self.reuse_pool.entry(template_type).or_default().push(root);
    }

    pub fn pooled(&self) -> usize {
        self.reuse_pool.values().map(Vec::len).sum()
    }

    /// Every cell root the list owns, visible or pooled.
    pub(crate) fn cell_roots(&self) -> Vec<ViewId> {
        self.cells
            .values()
            .map(|cell| cell.root)
            .chain(self.reuse_pool.values().flatten().copied())
            .collect()
    }

    fn stride(&self) -> f32 {
        self.item_extent + self.spacing
    }

    fn main(&self, v: Vec2) -> f32 {
        match self.axis {
            Axis::Vertical => v.y,
            Axis::Horizontal => v.x,
        }
    }

    fn leading_inset(&self) -> f32 {
        match self.axis {
            Axis::Vertical => self.insets.top,
            Axis::Horizontal => self.insets.left,
        }
    }

    /// Frame of `row` in content coordinates for a list of the given size.
    pub fn slot_frame(&self, row: usize, bounds: Vec2) -> Frame {
        let along = self.leading_inset() + row as f32 * self.stride();
        match self.axis {
            Axis::Vertical => Frame::new(
                self.insets.left,
                along,
                (bounds.x - self.insets.horizontal()).max(0.0),
                self.item_extent,
            ),
            Axis::Horizontal => Frame::new(
                along,
                self.insets.top,
                self.item_extent,
                (bounds.y - self.insets.vertical()).max(0.0),
            ),
        }
    }

    pub fn content_size(&self, bounds: Vec2) -> Vec2 {
        let count = self.items.len() as f32;
        let rows = if self.items.is_empty() {
            0.0
        } else {
            count * self.item_extent + (count - 1.0) * self.spacing
        };
        match self.axis {
            Axis::Vertical => Vec2::new(bounds.x, rows + self.insets.vertical()),
            Axis::Horizontal => Vec2::new(rows + self.insets.horizontal(), bounds.y),
        }
    }

    /// Keeps the offset between the start of the content and its last full viewport.
    pub(crate) fn clamp_offset(&mut self, bounds: Vec2) {
        let max = (self.main(self.content_size(bounds)) - self.main(bounds)).max(0.0);
        self.offset = self.offset.clamp(0.0, max);
    }

    /// Rows intersecting the viewport at the current offset.
    pub fn visible_rows(&self, bounds: Vec2) -> Range<usize> {
        let viewport = self.main(bounds);
        if viewport <= 0.0 || self.items.is_empty() {
            return 0..0;
        }
        let start = self.offset - self.leading_inset();
        let end = start + viewport;
        if end <= 0.0 {
            return 0..0;
        }
        let stride = self.stride().max(f32::EPSILON);
        let first = (start.max(0.0) / stride).floor() as usize;
        let last = ((end / stride).ceil() as usize).min(self.items.len());
        first.min(last)..last
    }

    /// Converts a point in the list's visible space into content coordinates.
    pub fn to_content(&self, point: Vec2) -> Vec2 {
        match self.axis {
            Axis::Vertical => point + Vec2::new(0.0, self.offset),
            Axis::Horizontal => point + Vec2::new(self.offset, 0.0),
        }
    }
}

impl std::fmt::Debug for ListView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListView")
            .field("view", &self.view)
            .field("data_expr", &self.data_expr)
            .field("items", &self.items.len())
            .field("cells", &self.cells.len())
            .field("pooled", &self.pooled())
            .field("offset", &self.offset)
            .finish()
    }
}
