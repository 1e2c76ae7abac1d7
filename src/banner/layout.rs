//! Scene configuration and tile stack construction.

use anyhow::{ensure, Context as _};
use tracing::trace;

use super::TileInventory;
use crate::geometry::{
    declared_width, points_attr, seam_offset, tile_footprint, tile_points, view_box, Orientation,
    Side,
};
use crate::scene::{ElementKind, NodeId, Scene};

/// Applies the orientation's sizing to the scene element and its image
/// resources. Must run before [`build`].
pub(super) fn configure_scene(
    scene: &mut impl Scene,
    svg: NodeId,
    orientation: Orientation,
) -> anyhow::Result<()> {
    scene.set_attr(svg, "preserveAspectRatio", "xMinYMin meet");
    scene.set_attr(svg, "viewBox", &view_box(orientation).to_string());
    scene.set_attr(svg, "width", declared_width(orientation));
    scene.set_attr(svg, "class", "svg-content");

    let footprint = tile_footprint(orientation);
    let width = footprint.width.to_string();
    let height = footprint.height.to_string();

    for defs in scene.children_of_kind(svg, ElementKind::Defs) {
        let pattern = scene
            .child_of_kind(defs, ElementKind::Pattern)
            .context("defs entry has no pattern")?;
        let image = scene
            .child_of_kind(pattern, ElementKind::Image)
            .context("pattern has no image")?;

        for node in [pattern, image] {
            scene.set_attr(node, "width", &width);
            scene.set_attr(node, "height", &height);
        }
    }

    Ok(())
}

/// Builds the full tile stack for both sides under a fresh group and returns
/// it. Safe to call again after the previous group was removed; the result
/// is identical for identical inputs.
pub(super) fn build(
    scene: &mut impl Scene,
    svg: NodeId,
    orientation: Orientation,
    inventory: &TileInventory,
) -> anyhow::Result<NodeId> {
    let group = scene.append(svg, ElementKind::Group, None);
    for (side, count) in [(Side::Left, inventory.left), (Side::Right, inventory.right)] {
        build_side(scene, group, side, orientation, count)?;
    }
    Ok(group)
}

fn build_side(
    scene: &mut impl Scene,
    group: NodeId,
    side: Side,
    orientation: Orientation,
    count: usize,
) -> anyhow::Result<()> {
    trace!("building {} side with {count} tiles", side.name());

    for i in 0..count {
        let tile_number = i + 1;
        if i == 0 {
            // The wrap tile duplicates the last image so the seam stays
            // covered while the cycle restarts.
            draw_tile(scene, group, side, orientation, 0, count)?;
        }
        draw_tile(scene, group, side, orientation, tile_number, tile_number)?;
    }
    Ok(())
}

fn draw_tile(
    scene: &mut impl Scene,
    group: NodeId,
    side: Side,
    orientation: Orientation,
    id_number: usize,
    image_number: usize,
) -> anyhow::Result<()> {
    let image_id = format!("img_{}{image_number}", side.name());
    ensure!(
        scene.select(&image_id).is_some(),
        "no image pattern {image_id} in the scene",
    );

    let elem_id = format!("{}_split_{id_number}", side.name());
    let polygon = scene.append(group, ElementKind::Polygon, Some(&elem_id));
    scene.set_attr(polygon, "points", &points_attr(tile_points(orientation, side)));
    scene.set_attr(polygon, "fill", &format!("url(#{image_id})"));

    if side == Side::Right {
        scene.set_attr(polygon, "transform", &seam_offset(orientation).to_string());
    }

    Ok(())
}
