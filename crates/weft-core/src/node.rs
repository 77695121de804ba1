// crates/weft-core/src/node.rs
use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::{CoreError, Result};

pub type Attributes = HashMap<String, String>;

/// Template node discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum NodeKind {
    Container,
    Text,
    Button,
    Image,
    Input,
    Scroll,
    Switch,
    Slider,
    List,
    /// Per-item template definition consumed by a list.
    Template,
    Custom(String),
}

impl NodeKind {
    /// Normalises a markup tag name. Unknown tags become [`NodeKind::Custom`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "container" | "view" | "div" | "header" | "footer" | "content" => NodeKind::Container,
            "text" | "label" => NodeKind::Text,
            "button" => NodeKind::Button,
            "image" | "img" => NodeKind::Image,
            "input" | "textfield" | "edittext" => NodeKind::Input,
            "scroll" | "scrollview" | "scroll-view" => NodeKind::Scroll,
            "switch" | "toggle" => NodeKind::Switch,
            "slider" => NodeKind::Slider,
            "list" | "listview" | "list-view" => NodeKind::List,
            "template" => NodeKind::Template,
            _ => NodeKind::Custom(tag.trim().to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            NodeKind::Container => "container",
            NodeKind::Text => "text",
            NodeKind::Button => "button",
            NodeKind::Image => "image",
            NodeKind::Input => "input",
            NodeKind::Scroll => "scroll",
            NodeKind::Switch => "switch",
            NodeKind::Slider => "slider",
            NodeKind::List => "list",
            NodeKind::Template => "template",
            NodeKind::Custom(name) => name,
        }
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        NodeKind::from_tag(&tag)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Parsed `for="item in list"` directive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct RepeatSpec {
    pub item_name: String,
    pub list_expr: String,
}

impl RepeatSpec {
    pub fn parse(source: &str) -> Result<Self> {
        let (item, list) = source
            .split_once(" in ")
            .ok_or_else(|| CoreError::InvalidRepeat(source.to_string()))?;

        let item_name = item.trim();
        let list_expr = list.trim();
        let valid_name = !item_name.is_empty()
            && item_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
            && !item_name.starts_with(|c: char| c.is_ascii_digit());

        if !valid_name || list_expr.is_empty() {
            return Err(CoreError::InvalidRepeat(source.to_string()));
        }

        Ok(Self {
            item_name: item_name.to_string(),
            list_expr: list_expr.to_string(),
        })
    }
}

impl TryFrom<String> for RepeatSpec {
    type Error = CoreError;

    fn try_from(source: String) -> Result<Self> {
        RepeatSpec::parse(&source)
    }
}

/// Immutable template tree unit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default, rename = "if")]
    pub condition: Option<String>,
    #[serde(default, rename = "for")]
    pub repeat: Option<RepeatSpec>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: Attributes::new(),
            children: Vec::new(),
            condition: None,
            repeat: None,
        }
    }

    pub fn tag(tag: &str) -> Self {
        Self::new(NodeKind::from_tag(tag))
    }

    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn repeat(mut self, spec: &str) -> Result<Self> {
        self.repeat = Some(RepeatSpec::parse(spec)?);
        Ok(self)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn is_template(&self) -> bool {
        self.kind == NodeKind::Template
    }
}
