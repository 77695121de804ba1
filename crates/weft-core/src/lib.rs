// crates/weft-core/src/lib.rs
pub mod events;
pub mod node;
pub mod path;
pub mod properties;
pub mod style;
pub mod value;
pub mod view;

pub use events::*;
pub use node::*;
pub use path::*;
pub use properties::*;
pub use style::*;
pub use value::*;
pub use view::*;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid repeat directive '{0}': expected 'item in expression'")]
    InvalidRepeat(String),

    #[error("Invalid data path: {0}")]
    InvalidPath(String),

    #[error("Cannot write '{path}': {reason}")]
    PathWrite { path: String, reason: String },

    #[error("Invalid template JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
