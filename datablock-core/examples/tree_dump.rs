//! Example: Parse a data block document and navigate the tree.
//!
//! Run with: cargo run --example tree_dump

use datablock_core::{Block, ParamType};

fn main() {
    let input = r#"// Game settings
version:U32 = 3
title:String = "Maze Runner" // shown in the window title

video
{
  resolution:Vec2S32 = 1920, 1080
  fullscreen:Bool = true
  gamma:F32 = 2.2
}

/* Keys are listed in order */
controls
{
  bindings
  {
    key:String = W
    key:String = A
    key:String = S
    key:String = D
  }
}
"#;

    let root = Block::parse(input).expect("parse failed");

    println!("=== Tree ===\n");
    print_block(&root, 0);

    println!("\n=== Lookups ===\n");
    println!("version: {}", root.get_u32("version", 0));
    println!("title: {}", root.get_string("title", "untitled"));

    let video = root.get_block_or_empty("video");
    println!("resolution: {:?}", video.get_vec2_s32("resolution", [640, 480]));
    println!("missing: {}", video.get_f32("brightness", 1.0));

    let keys = root.get_block_or_empty("controls").get_block_as_string_list("bindings");
    println!("keys: {:?}", keys);

    println!("\n=== Comments ===\n");
    for comment in root.comments() {
        println!("{:?} {:?}: {:?}", comment.style, comment.placement, comment.text);
    }
}

fn print_block(block: &Block, depth: usize) {
    let indent = "  ".repeat(depth);

    if block.name().is_empty() {
        println!("{}(root)", indent);
    } else {
        println!("{}{}", indent, block.name());
    }

    for param in block.params() {
        let value = match param.param_type() {
            ParamType::String => format!("{:?}", param.value.as_str().unwrap_or("")),
            _ => param.value.to_string(),
        };
        println!("{}  {}:{} = {}", indent, param.name, param.param_type(), value);
    }

    for child in block.blocks() {
        print_block(child, depth + 1);
    }
}
