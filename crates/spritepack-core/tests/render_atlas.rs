use image::{Rgba, RgbaImage};
use spritepack_core::prelude::*;
use spritepack_core::render::DEBUG_PALETTE;

const RED: [u8; 4] = [200, 0, 0, 255];
const GREEN: [u8; 4] = [0, 200, 0, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn solid(w: u32, h: u32, c: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(c))
}

fn two_sprite_packer(padding: u32) -> Packer<RgbaImage> {
    let mut packer = Packer::new(20, 10, padding);
    packer.add(solid(5, 5, RED), 5, 5).unwrap();
    packer.add(solid(3, 4, GREEN), 3, 4).unwrap();
    packer.pack().expect("both sprites fit");
    packer
}

#[test]
fn sprites_land_at_their_placed_origins() {
    let packer = two_sprite_packer(0);
    let img = render_atlas(packer.tree(), &RenderOptions::default());

    assert_eq!(img.dimensions(), (20, 10));
    assert_eq!(img.get_pixel(0, 0).0, RED);
    assert_eq!(img.get_pixel(4, 4).0, RED);
    assert_eq!(img.get_pixel(5, 0).0, GREEN);
    assert_eq!(img.get_pixel(7, 3).0, GREEN);
    assert_eq!(img.get_pixel(8, 0).0, WHITE);
    assert_eq!(img.get_pixel(0, 9).0, WHITE);
}

#[test]
fn padding_leaves_a_background_margin() {
    let packer = two_sprite_packer(2);
    let img = render_atlas(
        packer.tree(),
        &RenderOptions {
            background: [0, 0, 0, 0],
            debug_overlay: false,
        },
    );

    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(img.get_pixel(1, 1).0, RED);
    assert_eq!(img.get_pixel(5, 5).0, RED);
    assert_eq!(img.get_pixel(6, 6).0, [0, 0, 0, 0]);
    // Second sprite starts after the first padded slot (7 wide) plus half padding.
    assert_eq!(img.get_pixel(8, 1).0, GREEN);
    assert_eq!(img.get_pixel(7, 1).0, [0, 0, 0, 0]);
}

#[test]
fn overlay_colour_follows_node_depth() {
    let packer = two_sprite_packer(0);
    let img = render_atlas(
        packer.tree(),
        &RenderOptions {
            debug_overlay: true,
            ..Default::default()
        },
    );

    // Root outline (depth 0).
    assert_eq!(*img.get_pixel(0, 0), DEBUG_PALETTE[0]);
    // Root's bottom child (depth 1) is drawn over the root's left edge.
    assert_eq!(*img.get_pixel(0, 9), DEBUG_PALETTE[1]);
    // Right child of the second sprite (depth 2) is the last to touch the top edge here.
    assert_eq!(*img.get_pixel(10, 0), DEBUG_PALETTE[2]);
    // Interior of the first sprite is untouched.
    assert_eq!(img.get_pixel(2, 2).0, RED);
}

#[test]
fn overlay_on_unpacked_tree_outlines_the_atlas() {
    let tree: PartitionTree<RgbaImage> = PartitionTree::new(6, 4, 0);
    let mut canvas = solid(6, 4, WHITE);
    draw_debug_overlay(&mut canvas, &tree);

    assert_eq!(*canvas.get_pixel(0, 0), DEBUG_PALETTE[0]);
    assert_eq!(*canvas.get_pixel(5, 3), DEBUG_PALETTE[0]);
    assert_eq!(canvas.get_pixel(2, 1).0, WHITE);
}

#[test]
fn pipeline_renders_and_reports_layout() {
    let inputs = vec![
        InputSprite::new("wide", solid(30, 10, RED)),
        InputSprite::new("tall", solid(10, 20, GREEN)),
    ];
    let cfg = PackerConfig::builder().with_dimensions(64, 32).build();
    let out = pack_sprites(inputs, &cfg).unwrap();

    assert_eq!(out.rgba.dimensions(), (64, 32));
    let keys: Vec<&str> = out.layout.placements.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["tall", "wide"]);
    assert_eq!(out.rgba.get_pixel(0, 0).0, GREEN);
    assert_eq!(out.rgba.get_pixel(10, 0).0, RED);
    assert_eq!(out.stats().used_area, 30 * 10 + 10 * 20);
}

#[test]
fn pipeline_with_no_inputs_gives_blank_atlas() {
    let cfg = PackerConfig::builder()
        .with_dimensions(8, 8)
        .background([1, 2, 3, 4])
        .build();
    let out = pack_sprites(Vec::new(), &cfg).unwrap();
    assert!(out.layout.placements.is_empty());
    assert!(out.rgba.pixels().all(|p| p.0 == [1, 2, 3, 4]));
}

#[test]
fn pipeline_surfaces_no_space() {
    let inputs = vec![InputSprite::new("huge", solid(40, 40, RED))];
    let cfg = PackerConfig::builder().with_dimensions(32, 32).build();
    match pack_sprites(inputs, &cfg) {
        Err(SpritePackError::NoSpace { index: 0, .. }) => {}
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("expected NoSpace"),
    }
}
