//! Document tree: blocks, params and preserved comments.
//!
//! A [`Block`] owns two ordered sequences: its params and its child blocks.
//! Comments live inside those same sequences so they can be written back at
//! the position they were read from, but every public lookup skips them.
//!
//! # Example
//!
//! ```
//! use datablock_core::Block;
//!
//! let mut root = Block::new();
//! root.add_param_s32("width", 640);
//! let window = root.create_block("window");
//! window.add_param_string("title", "Maze");
//!
//! assert_eq!(root.get_s32("width", 0), 640);
//! assert_eq!(root.get_block_or_empty("window").get_string("title", ""), "Maze");
//! assert!(root.get_block_or_empty("missing").is_empty());
//! ```

use std::borrow::Cow;

use crate::error::{Error, Result, ValueError};
use crate::value::{ParamData, ParamType, ParamValue};

/// Control prefix that marks comment pseudo-names.
pub const RESERVED_PREFIX: char = '\u{1}';

/// True if `name` starts with the reserved comment prefix.
#[inline]
pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentStyle {
    /// `/* ... */`
    C,
    /// `// ...`
    Cpp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentPlacement {
    /// On its own line(s), before the next statement.
    Standalone,
    /// At the end of the previous statement's line.
    Trailing,
}

/// A comment preserved from the source text.
///
/// `text` is everything between the delimiters, without them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub style: CommentStyle,
    pub placement: CommentPlacement,
    pub text: String,
}

impl Comment {
    pub fn new(style: CommentStyle, placement: CommentPlacement, text: impl Into<String>) -> Self {
        Self {
            style,
            placement,
            text: text.into(),
        }
    }

    /// Reserved pseudo-name for this style and placement.
    pub fn reserved_name(&self) -> &'static str {
        match (self.style, self.placement) {
            (CommentStyle::C, CommentPlacement::Standalone) => "\u{1}c",
            (CommentStyle::Cpp, CommentPlacement::Standalone) => "\u{1}cpp",
            (CommentStyle::C, CommentPlacement::Trailing) => "\u{1}c_eol",
            (CommentStyle::Cpp, CommentPlacement::Trailing) => "\u{1}cpp_eol",
        }
    }

    /// Decode a reserved pseudo-name into a style and placement.
    pub fn kind_from_reserved_name(name: &str) -> Option<(CommentStyle, CommentPlacement)> {
        match name {
            "\u{1}c" => Some((CommentStyle::C, CommentPlacement::Standalone)),
            "\u{1}cpp" => Some((CommentStyle::Cpp, CommentPlacement::Standalone)),
            "\u{1}c_eol" => Some((CommentStyle::C, CommentPlacement::Trailing)),
            "\u{1}cpp_eol" => Some((CommentStyle::Cpp, CommentPlacement::Trailing)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_trailing(&self) -> bool {
        self.placement == CommentPlacement::Trailing
    }
}

/// One slot of a param or child sequence.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Entry<T> {
    Item(T),
    Comment(Comment),
}

impl<T> Entry<T> {
    #[inline]
    pub(crate) fn item(&self) -> Option<&T> {
        match self {
            Entry::Item(item) => Some(item),
            Entry::Comment(_) => None,
        }
    }

    #[inline]
    fn item_mut(&mut self) -> Option<&mut T> {
        match self {
            Entry::Item(item) => Some(item),
            Entry::Comment(_) => None,
        }
    }

    #[inline]
    fn comment(&self) -> Option<&Comment> {
        match self {
            Entry::Item(_) => None,
            Entry::Comment(c) => Some(c),
        }
    }
}

/// Slot position of the `index`-th item, skipping comments.
fn item_slot<T>(entries: &[Entry<T>], index: usize) -> Option<usize> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, Entry::Item(_)))
        .nth(index)
        .map(|(slot, _)| slot)
}

/// Remove the item at `slot` together with the trailing comments attached to it.
fn remove_slot<T>(entries: &mut Vec<Entry<T>>, slot: usize) -> Option<T> {
    let removed = match entries.remove(slot) {
        Entry::Item(item) => item,
        Entry::Comment(_) => return None,
    };
    while matches!(entries.get(slot), Some(Entry::Comment(c)) if c.is_trailing()) {
        entries.remove(slot);
    }
    Some(removed)
}

// ============================================================================
// Param
// ============================================================================

/// A named, typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

impl Param {
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    #[inline]
    pub fn param_type(&self) -> ParamType {
        self.value.param_type()
    }
}

// ============================================================================
// Block
// ============================================================================

/// A named node owning ordered params and child blocks.
///
/// Names are not unique: lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    name: String,
    params: Vec<Entry<Param>>,
    children: Vec<Entry<Block>>,
}

impl Block {
    /// Create an empty root block (empty name).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// True if the block holds nothing at all, comments included.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.children.is_empty()
    }

    /// Drop all params, children and comments. The name is kept.
    pub fn clear(&mut self) {
        self.params.clear();
        self.children.clear();
    }

    pub(crate) fn param_entries(&self) -> &[Entry<Param>] {
        &self.params
    }

    pub(crate) fn block_entries(&self) -> &[Entry<Block>] {
        &self.children
    }

    // ---- Params ----

    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter_map(Entry::item)
    }

    pub fn param_count(&self) -> usize {
        self.params().count()
    }

    pub fn param(&self, index: usize) -> Option<&Param> {
        self.params().nth(index)
    }

    pub fn param_mut(&mut self, index: usize) -> Option<&mut Param> {
        self.params.iter_mut().filter_map(Entry::item_mut).nth(index)
    }

    /// Index of the first param called `name`. Reserved names never match.
    pub fn find_param_index(&self, name: &str) -> Option<usize> {
        if is_reserved_name(name) {
            return None;
        }
        self.params().position(|p| p.name == name)
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.find_param_index(name).is_some()
    }

    /// First param called `name`.
    pub fn get_param(&self, name: &str) -> Option<&Param> {
        self.find_param_index(name).and_then(|i| self.param(i))
    }

    pub fn get_param_mut(&mut self, name: &str) -> Option<&mut Param> {
        let index = self.find_param_index(name)?;
        self.param_mut(index)
    }

    /// Value of the first param called `name`, or `default` if there is none
    /// or it has a different type.
    pub fn get_param_value<T: ParamData>(&self, name: &str, default: T) -> T {
        self.get_param(name)
            .and_then(|p| T::from_value(&p.value))
            .unwrap_or(default)
    }

    /// Append a param and return its index.
    ///
    /// A reserved comment pseudo-name with a `String` value is stored as a
    /// comment instead; the returned index is then the one the next param
    /// will take.
    pub fn add_param(&mut self, name: impl Into<String>, value: ParamValue) -> usize {
        let name = name.into();
        if let (Some((style, placement)), ParamValue::String(text)) =
            (Comment::kind_from_reserved_name(&name), &value)
        {
            self.params
                .push(Entry::Comment(Comment::new(style, placement, text.clone())));
            return self.param_count();
        }

        let index = self.param_count();
        self.params.push(Entry::Item(Param::new(name, value)));
        index
    }

    pub fn add_param_value<T: ParamData>(&mut self, name: impl Into<String>, value: T) -> usize {
        self.add_param(name, value.into_value())
    }

    /// Read `text` as `ty` and append the result.
    pub fn add_param_text(
        &mut self,
        name: impl Into<String>,
        ty: ParamType,
        text: &str,
    ) -> std::result::Result<usize, ValueError> {
        let value = ParamValue::parse(ty, text)?;
        Ok(self.add_param(name, value))
    }

    /// Replace the param at `index` (type and value together).
    pub fn set_param(&mut self, index: usize, value: ParamValue) -> Result<()> {
        let count = self.param_count();
        match self.param_mut(index) {
            Some(param) => {
                param.value = value;
                Ok(())
            }
            None => Err(Error::ParamIndex { index, count }),
        }
    }

    /// Overwrite the first param called `name`, or append one. Returns its index.
    pub fn set_param_by_name(&mut self, name: impl Into<String>, value: ParamValue) -> usize {
        let name = name.into();
        match self.find_param_index(&name) {
            Some(index) => {
                if let Some(param) = self.param_mut(index) {
                    param.value = value;
                }
                index
            }
            None => self.add_param(name, value),
        }
    }

    /// Remove every param called `name`. Returns true if any was removed.
    pub fn remove_param(&mut self, name: &str) -> bool {
        let mut removed = false;
        while let Some(index) = self.find_param_index(name) {
            self.remove_param_at(index);
            removed = true;
        }
        removed
    }

    /// Remove the param at `index` and its trailing comments.
    pub fn remove_param_at(&mut self, index: usize) -> Option<Param> {
        let slot = item_slot(&self.params, index)?;
        remove_slot(&mut self.params, slot)
    }

    pub fn add_param_string(&mut self, name: impl Into<String>, value: impl Into<String>) -> usize {
        self.add_param(name, ParamValue::String(value.into()))
    }

    /// String value of the first param called `name`.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get_param(name).and_then(|p| p.value.as_str())
    }

    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.get_str(name).unwrap_or(default).to_owned()
    }

    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) -> usize {
        self.set_param_by_name(name, ParamValue::String(value.into()))
    }

    // ---- Blocks ----

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.children.iter().filter_map(Entry::item)
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.children.iter_mut().filter_map(Entry::item_mut)
    }

    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks().nth(index)
    }

    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks_mut().nth(index)
    }

    /// Index of the first child called `name`. Reserved names never match.
    pub fn find_block_index(&self, name: &str) -> Option<usize> {
        if is_reserved_name(name) {
            return None;
        }
        self.blocks().position(|b| b.name == name)
    }

    /// Append `block` as the last child and return it.
    pub fn add_block(&mut self, block: Block) -> &mut Block {
        self.children.push(Entry::Item(block));
        match self.children.last_mut() {
            Some(Entry::Item(block)) => block,
            _ => unreachable!("a block was just pushed"),
        }
    }

    /// Append a new empty child called `name` and return it.
    pub fn create_block(&mut self, name: impl Into<String>) -> &mut Block {
        self.add_block(Block::named(name))
    }

    /// First child called `name`, created if missing.
    pub fn ensure_block(&mut self, name: &str) -> &mut Block {
        match self.find_block_index(name) {
            Some(index) => match self.block_mut(index) {
                Some(block) => block,
                None => unreachable!("index came from find_block_index"),
            },
            None => self.create_block(name),
        }
    }

    pub fn get_block(&self, name: &str) -> Option<&Block> {
        self.find_block_index(name).and_then(|i| self.block(i))
    }

    pub fn get_block_mut(&mut self, name: &str) -> Option<&mut Block> {
        let index = self.find_block_index(name)?;
        self.block_mut(index)
    }

    /// First child called `name`, or a fresh empty block.
    pub fn get_block_or_empty(&self, name: &str) -> Cow<'_, Block> {
        match self.get_block(name) {
            Some(block) => Cow::Borrowed(block),
            None => Cow::Owned(Block::named(name)),
        }
    }

    /// String params of the child called `name`, in order.
    ///
    /// Covers the `tags { t:String = a  t:String = b }` idiom.
    pub fn get_block_as_string_list(&self, name: &str) -> Vec<String> {
        self.get_block(name)
            .map(|block| {
                block
                    .params()
                    .filter_map(|p| p.value.as_str())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove every child called `name`. Returns true if any was removed.
    pub fn remove_block(&mut self, name: &str) -> bool {
        let mut removed = false;
        while let Some(index) = self.find_block_index(name) {
            self.remove_block_at(index);
            removed = true;
        }
        removed
    }

    /// Remove the child at `index` and its trailing comments.
    pub fn remove_block_at(&mut self, index: usize) -> Option<Block> {
        let slot = item_slot(&self.children, index)?;
        remove_slot(&mut self.children, slot)
    }

    // ---- Comments ----

    /// Append a comment to the param sequence.
    pub fn add_comment(&mut self, comment: Comment) {
        self.params.push(Entry::Comment(comment));
    }

    /// Append a comment to the child block sequence.
    pub fn add_block_comment(&mut self, comment: Comment) {
        self.children.push(Entry::Comment(comment));
    }

    /// All comments of this block (params section first), not recursive.
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.params
            .iter()
            .filter_map(Entry::comment)
            .chain(self.children.iter().filter_map(Entry::comment))
    }

    /// True if the block has at least one real child block.
    pub(crate) fn has_blocks(&self) -> bool {
        self.children.iter().any(|e| matches!(e, Entry::Item(_)))
    }
}

macro_rules! typed_accessors {
    ($($native:ty => $add:ident, $get:ident, $set:ident;)*) => {
        impl Block {
            $(
                #[doc = concat!("Append a `", stringify!($native), "` param and return its index.")]
                pub fn $add(&mut self, name: impl Into<String>, value: $native) -> usize {
                    self.add_param_value(name, value)
                }

                #[doc = concat!("`", stringify!($native), "` value of the first param called `name`, or `default`.")]
                pub fn $get(&self, name: &str, default: $native) -> $native {
                    self.get_param_value(name, default)
                }

                #[doc = concat!("Overwrite or append a `", stringify!($native), "` param.")]
                pub fn $set(&mut self, name: impl Into<String>, value: $native) -> usize {
                    self.set_param_by_name(name, value.into_value())
                }
            )*
        }
    };
}

typed_accessors! {
    i32 => add_param_s32, get_s32, set_s32;
    i64 => add_param_s64, get_s64, set_s64;
    u32 => add_param_u32, get_u32, set_u32;
    u64 => add_param_u64, get_u64, set_u64;
    f32 => add_param_f32, get_f32, set_f32;
    f64 => add_param_f64, get_f64, set_f64;
    bool => add_param_bool, get_bool, set_bool;
    [i32; 2] => add_param_vec2_s32, get_vec2_s32, set_vec2_s32;
    [i32; 3] => add_param_vec3_s32, get_vec3_s32, set_vec3_s32;
    [i32; 4] => add_param_vec4_s32, get_vec4_s32, set_vec4_s32;
    [u32; 2] => add_param_vec2_u32, get_vec2_u32, set_vec2_u32;
    [u32; 3] => add_param_vec3_u32, get_vec3_u32, set_vec3_u32;
    [u32; 4] => add_param_vec4_u32, get_vec4_u32, set_vec4_u32;
    [f32; 2] => add_param_vec2_f32, get_vec2_f32, set_vec2_f32;
    [f32; 3] => add_param_vec3_f32, get_vec3_f32, set_vec3_f32;
    [f32; 4] => add_param_vec4_f32, get_vec4_f32, set_vec4_f32;
    [bool; 2] => add_param_vec2_b, get_vec2_b, set_vec2_b;
    [bool; 3] => add_param_vec3_b, get_vec3_b, set_vec3_b;
    [bool; 4] => add_param_vec4_b, get_vec4_b, set_vec4_b;
    [i8; 4] => add_param_vec4_s8, get_vec4_s8, set_vec4_s8;
    [u8; 4] => add_param_vec4_u8, get_vec4_u8, set_vec4_u8;
    [f32; 9] => add_param_mat3_f32, get_mat3_f32, set_mat3_f32;
    [f32; 16] => add_param_mat4_f32, get_mat4_f32, set_mat4_f32;
    [f32; 12] => add_param_tmat, get_tmat, set_tmat;
}

// ============================================================================
// Tests
// ============================================================================
