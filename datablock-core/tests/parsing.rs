//! Integration tests for data block parsing.
//!
//! Organized by grammar construct, from simplest to most complex.
//! Each test checks the resulting tree through the public API.

use datablock_core::{
    Block, Comment, CommentPlacement, CommentStyle, Error, ParamType, ParamValue,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn parse(input: &str) -> Block {
    match Block::parse(input) {
        Ok(block) => block,
        Err(err) => panic!("parse failed for {input:?}: {err}"),
    }
}

fn parse_err(input: &str) -> Error {
    match Block::parse(input) {
        Ok(block) => panic!("expected an error for {input:?}, got:\n{block}"),
        Err(err) => err,
    }
}

/// Param types in declaration order.
fn types(block: &Block) -> Vec<ParamType> {
    block.params().map(|p| p.param_type()).collect()
}

// =============================================================================
// Params
// =============================================================================

mod params {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_type_by_canonical_name() {
        let input = "\
a:S32 = 1
b:S64 = 2
c:U32 = 3
d:U64 = 4
e:F32 = 5
f:F64 = 6
g:Bool = true
h:Vec2S32 = 1, 2
i:Vec3S32 = 1, 2, 3
j:Vec4S32 = 1, 2, 3, 4
k:Vec2U32 = 1, 2
l:Vec3U32 = 1, 2, 3
m:Vec4U32 = 1, 2, 3, 4
n:Vec2F32 = 1, 2
o:Vec3F32 = 1, 2, 3
p:Vec4F32 = 1, 2, 3, 4
q:Vec2B = true, false
r:Vec3B = true, false, true
s:Vec4B = true, false, true, false
t:Vec4S8 = 1, 2, 3, 4
u:Vec4U8 = 1, 2, 3, 4
v:Mat3F32 = [[1, 0, 0] [0, 1, 0] [0, 0, 1]]
w:Mat4F32 = [[1, 0, 0, 0] [0, 1, 0, 0] [0, 0, 1, 0] [0, 0, 0, 1]]
x:TMat = [[1, 0, 0] [0, 1, 0] [0, 0, 1] [0, 0, 0]]
y:String = text
";
        let root = parse(input);
        assert_eq!(types(&root), ParamType::ALL.to_vec());
        assert_eq!(root.to_text(), input);
    }

    #[test]
    fn scalar_values() {
        let root = parse("a:S32 = -7\nb:U64 = 18446744073709551615\nc:F64 = 0.125\n");
        assert_eq!(root.get_s32("a", 0), -7);
        assert_eq!(root.get_u64("b", 0), u64::MAX);
        assert_eq!(root.get_f64("c", 0.0), 0.125);
    }

    #[test]
    fn vector_arity() {
        let root = parse("v:Vec2S32 = 1,2");
        assert_eq!(root.get_vec2_s32("v", [0, 0]), [1, 2]);

        let err = parse_err("v:Vec2S32 = 1,2,3");
        assert!(matches!(err, Error::TypeMismatch { line: 1, .. }), "{err:?}");
    }

    #[test]
    fn matrix_rows() {
        let root = parse("m:Mat3F32 = [[1, 2, 3] [4, 5, 6] [7, 8, 9]]");
        assert_eq!(
            root.get_mat3_f32("m", [0.0; 9]),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn first_match_wins() {
        let root = parse("a:S32 = 1\na:S32 = 2\n");
        assert_eq!(root.param_count(), 2);
        assert_eq!(root.get_s32("a", 0), 1);
        assert_eq!(root.param(1).map(|p| &p.value), Some(&ParamValue::S32(2)));
    }

    #[test]
    fn untyped_param_is_string() {
        let root = parse("greeting = hello there");
        assert_eq!(root.get_str("greeting"), Some("hello there"));
    }
}

// =============================================================================
// Blocks
// =============================================================================

mod blocks {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nested_lookup() {
        let root = parse(
            "render\n{\n  quality:S32 = 2\n  shadows\n  {\n    enabled:Bool = true\n  }\n}\n",
        );
        let render = root.get_block("render").expect("render block");
        assert_eq!(render.get_s32("quality", 0), 2);
        assert!(render.get_block_or_empty("shadows").get_bool("enabled", false));
    }

    #[test]
    fn missing_block_reads_defaults() {
        let root = parse("a:S32 = 1");
        let missing = root.get_block_or_empty("settings");
        assert!(missing.is_empty());
        assert_eq!(missing.get_f32("scale", 1.0), 1.0);
    }

    #[test]
    fn block_order_preserved() {
        let root = parse("c{}\na{}\nb{}\n");
        let names: Vec<&str> = root.blocks().map(Block::name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn string_list() {
        let root = parse("tags\n{\n  t:String = red\n  t:String = \"dark blue\"\n  n:S32 = 3\n}\n");
        assert_eq!(root.get_block_as_string_list("tags"), vec!["red", "dark blue"]);
    }

    #[test]
    fn empty_block_on_one_line() {
        let root = parse("a{}");
        assert_eq!(root.block_count(), 1);
        assert!(root.block(0).unwrap().is_empty());
    }
}

// =============================================================================
// Strings
// =============================================================================

mod strings {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn multiline_round_trip() {
        let mut root = Block::new();
        root.add_param_string("s", "line1\nline2");
        let text = root.to_text();
        assert!(text.contains("\"\"\""));
        assert_eq!(parse(&text).get_str("s"), Some("line1\nline2"));
    }

    #[test]
    fn escape_fidelity() {
        let value = "he said \"it's\"\nthen ~left~";
        let mut root = Block::new();
        root.add_param_string("s", value);
        assert_eq!(parse(&root.to_text()).get_str("s"), Some(value));
    }

    #[test]
    fn triple_quote_drops_opening_line_break_only() {
        let root = parse("s:String = \"\"\"  \n\nbody\n\"\"\"");
        assert_eq!(root.get_str("s"), Some("\nbody"));
    }

    #[test]
    fn unquoted_value_stops_at_line_comment() {
        let root = parse("s:String = value // note");
        assert_eq!(root.get_str("s"), Some("value"));
        assert_eq!(root.comments().count(), 1);
    }
}

// =============================================================================
// Comments
// =============================================================================

mod comments {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn placement_round_trip() {
        let input = "// lead\nfoo:S32 = 1 // trail\nbar:S32 = 2\n";
        let root = parse(input);

        let comments: Vec<Comment> = root.comments().cloned().collect();
        assert_eq!(
            comments,
            vec![
                Comment::new(CommentStyle::Cpp, CommentPlacement::Standalone, " lead"),
                Comment::new(CommentStyle::Cpp, CommentPlacement::Trailing, " trail"),
            ]
        );
        assert_eq!(root.to_text(), input);
    }

    #[test]
    fn comments_do_not_count_as_params() {
        let root = parse("// a\n/* b */\nx:S32 = 1\n");
        assert_eq!(root.param_count(), 1);
        assert_eq!(root.find_param_index("x"), Some(0));
    }

    #[test]
    fn comment_only_document_is_not_empty() {
        let root = parse("// nothing else\n");
        assert!(!root.is_empty());
        assert_eq!(root.param_count(), 0);
        assert_eq!(root.to_text(), "// nothing else\n");
    }

    #[test]
    fn trailing_comment_after_block() {
        let root = parse("a\n{\n  x:S32 = 1\n} // done\nb{}\n");
        let comment = root.comments().next().expect("a comment");
        assert_eq!(comment.placement, CommentPlacement::Trailing);
        assert_eq!(comment.text, " done");
    }

    #[test]
    fn editing_keeps_comments() {
        let mut root = parse("// volume in percent\nvolume:S32 = 50 // default\n");
        root.set_s32("volume", 80);
        assert_eq!(root.to_text(), "// volume in percent\nvolume:S32 = 80 // default\n");
    }
}

// =============================================================================
// Errors
// =============================================================================

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unbalanced_braces_cite_eof() {
        let err = parse_err("block { foo:S32 = 1");
        assert!(matches!(err, Error::Syntax { .. }));
        assert!(err.to_string().contains("EOF"), "{err}");
    }

    #[test]
    fn unknown_type_is_named() {
        let err = parse_err("foo:Bogus = 1");
        assert!(matches!(err, Error::Syntax { line: 1, .. }));
        assert!(err.to_string().contains("Bogus"), "{err}");
    }

    #[test]
    fn error_lines() {
        let err = parse_err("a:S32 = 1\n\n  b\n  {\n    c:U32 = -1\n  }\n");
        assert_eq!(err.line(), Some(5));
    }

    #[test]
    fn type_mismatch_has_source() {
        use std::error::Error as _;
        let err = parse_err("a:S32 = twelve");
        assert!(err.source().is_some());
    }
}
