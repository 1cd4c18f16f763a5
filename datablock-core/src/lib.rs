//! Data Block Core
//!
//! Parser and writer for data block text: a hierarchical configuration format
//! of named blocks holding explicitly typed params, with comments preserved
//! through a load/edit/save cycle.
//!
//! ```text
//! // window settings
//! window
//! {
//!   size:Vec2S32 = 1280, 720
//!   title:String = "Main window" // shown in the title bar
//! }
//! ```
//!
//! # Architecture
//!
//! - **value.rs** - Param types, typed values, text conversion
//! - **tree.rs** - Block/Param tree and comment entries
//! - **cursor.rs** - Byte cursor with line tracking
//! - **parser.rs** - Recursive descent parser
//! - **writer.rs** - Serializer and layout options
//! - **file.rs** - Load/save with atomic replace
//! - **error.rs** - Error types

pub mod cursor;
pub mod error;
pub mod file;
pub mod parser;
pub mod tree;
pub mod value;
pub mod writer;

pub use error::{Error, Result, ValueError};
pub use file::{load_text, save_text, save_text_with};
pub use parser::parse;
pub use tree::{Block, Comment, CommentPlacement, CommentStyle, Param};
pub use value::{ParamData, ParamType, ParamValue};
pub use writer::WriteOptions;
