// crates/weft-core/src/path.rs
use std::fmt;

/// One step into a [`crate::Value`] graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Absolute location inside the view-model, e.g. `form.name` or `todos[2].done`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DataPath {
    segments: Vec<PathSegment>,
}

impl DataPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    pub fn join(&self, tail: &[PathSegment]) -> Self {
        let mut segments = self.segments.clone();
        segments.extend_from_slice(tail);
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first_key(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Key(key)) => Some(key),
            _ => None,
        }
    }

    /// Parses a plain accessor chain such as `viewModel.items[0].title`.
    ///
    /// Returns `None` for anything that is not a pure path (operators, calls, literals).
    pub fn parse(expr: &str) -> Option<Self> {
        let expr = expr.trim();
        let bytes = expr.as_bytes();
        let mut segments = Vec::new();
        let mut pos = 0;

        let ident = |start: usize| -> Option<usize> {
            let first = *bytes.get(start)?;
            if !(first.is_ascii_alphabetic() || first == b'_' || first == b'$') {
                return None;
            }
            let mut end = start + 1;
            while end < bytes.len()
                && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_' || bytes[end] == b'$')
            {
                end += 1;
            }
            Some(end)
        };

        let end = ident(pos)?;
        segments.push(PathSegment::Key(expr[pos..end].to_string()));
        pos = end;

        while pos < bytes.len() {
            match bytes[pos] {
                b'.' => {
                    let end = ident(pos + 1)?;
                    segments.push(PathSegment::Key(expr[pos + 1..end].to_string()));
                    pos = end;
                }
                b'[' => {
                    let close = expr[pos..].find(']')? + pos;
                    let index = expr[pos + 1..close].trim().parse::<usize>().ok()?;
                    segments.push(PathSegment::Index(index));
                    pos = close + 1;
                }
                _ => return None,
            }
        }

        Some(Self { segments })
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_member_and_index_chains() {
        let path = DataPath::parse("viewModel.todos[2].done").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("viewModel".into()),
                PathSegment::Key("todos".into()),
                PathSegment::Index(2),
                PathSegment::Key("done".into()),
            ]
        );
        assert_eq!(path.to_string(), "viewModel.todos[2].done");
    }

    #[test]
    fn rejects_non_paths() {
        assert!(DataPath::parse("count > 0").is_none());
        assert!(DataPath::parse("items.length + 1").is_none());
        assert!(DataPath::parse("'text'").is_none());
        assert!(DataPath::parse("toggle(index)").is_none());
        assert!(DataPath::parse("").is_none());
    }
}
