use std::fmt::{Display, Formatter};

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use svg::Document;
use svg::node::element::{Group, Rectangle, Text, Title};
use truckload::entities::{Placement, TruckSpec};

#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgDrawOptions {
    /// Size of the rendered document per metre of truck
    pub px_per_m: f64,
    /// Whitespace around and between the two views (m)
    pub margin: f64,
    /// Outline width of the boxes (m)
    pub stroke_width: f64,
    pub fill_opacity: f64,
    /// Labels every box with its item id
    pub draw_ids: bool,
}

impl Default for SvgDrawOptions {
    fn default() -> Self {
        Self {
            px_per_m: 100.0,
            margin: 0.3,
            stroke_width: 0.008,
            fill_opacity: 0.6,
            draw_ids: true,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Color(u8, u8, u8);

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

const TRUCK_FILL: Color = Color(0xEE, 0xEE, 0xEE);

/// Fill color of an item, per delivery stop
pub fn drop_order_color(drop_order: i32) -> Color {
    match drop_order {
        1 => Color(0x4C, 0x78, 0xA8), //BLUE
        2 => Color(0x59, 0xA1, 0x4F), //GREEN
        3 => Color(0xED, 0xC9, 0x48), //YELLOW
        4 => Color(0xF2, 0x8E, 0x2B), //ORANGE
        5 => Color(0xE1, 0x57, 0x59), //RED
        _ => Color(0x9D, 0x9D, 0x9D), //GREY
    }
}

/// Projection of a placement on one of the two views: `(u, v, extent_u, extent_v, depth)`.
/// Boxes with a higher depth are closer to the viewer and are painted last.
type Projection = (f64, f64, f64, f64, f64);

/// Draws a top view (x-y plane, seen from above) and a side view (x-z plane, seen from the side at y = 0)
/// of the loaded truck, colored by drop order.
pub fn layout_to_svg(placements: &[Placement], truck: &TruckSpec, options: SvgDrawOptions, title: &str) -> Document {
    let m = options.margin;
    let total_width = truck.length + 2.0 * m;
    let total_height = truck.width + truck.height + 3.0 * m;
    let font_size = 0.4 * m;

    let placed_volume: f64 = placements.iter().map(|p| p.volume()).sum();
    let total_weight: f64 = placements.iter().map(|p| p.weight).sum();

    let label = Text::new(format!(
        "{} | items: {} | volume: {:.2}% | weight: {:.2}%",
        title,
        placements.len(),
        placed_volume / truck.volume() * 100.0,
        total_weight / truck.payload_kg.max(f64::MIN_POSITIVE) * 100.0,
    ))
    .set("x", m)
    .set("y", 0.6 * m)
    .set("font-size", font_size)
    .set("font-family", "monospace")
    .set("font-weight", "500");

    //top view: y grows downwards in svg, which shows the truck as seen from above
    let top_view = draw_view(
        "top_view",
        (m, m),
        (truck.length, truck.width),
        placements.iter().map(|p| (p.x, p.y, p.length, p.width, p.top())),
        placements,
        options,
    );

    //side view: flipped so the floor is at the bottom, items close to y = 0 are in front
    let side_origin = (m, truck.width + 2.0 * m);
    let side_view = draw_view(
        "side_view",
        side_origin,
        (truck.length, truck.height),
        placements
            .iter()
            .map(|p| (p.x, truck.height - p.top(), p.length, p.height, -p.y)),
        placements,
        options,
    );

    Document::new()
        .set("viewBox", (0.0, 0.0, total_width, total_height))
        .set("width", total_width * options.px_per_m)
        .set("height", total_height * options.px_per_m)
        .add(label)
        .add(top_view)
        .add(side_view)
}

fn draw_view(
    id: &str,
    (ox, oy): (f64, f64),
    (width, height): (f64, f64),
    projections: impl Iterator<Item = Projection>,
    placements: &[Placement],
    options: SvgDrawOptions,
) -> Group {
    let sw = options.stroke_width;
    let mut group = Group::new().set("id", id).add(
        Rectangle::new()
            .set("x", ox)
            .set("y", oy)
            .set("width", width)
            .set("height", height)
            .set("fill", TRUCK_FILL.to_string())
            .set("stroke", "black")
            .set("stroke-width", 2.0 * sw),
    );

    let painted = projections
        .zip(placements)
        .sorted_by_key(|((.., depth), _)| OrderedFloat(*depth));

    for ((u, v, du, dv, _), p) in painted {
        let title = Title::new(format!(
            "id: {}, pos: ({:.3}, {:.3}, {:.3}), dims: {:.3} x {:.3} x {:.3}, weight: {:.2} kg, drop: {}{}",
            p.id,
            p.x,
            p.y,
            p.z,
            p.length,
            p.width,
            p.height,
            p.weight,
            p.drop_order,
            if p.fragile { ", fragile" } else { "" }
        ));
        let rect = Rectangle::new()
            .set("x", ox + u)
            .set("y", oy + v)
            .set("width", du)
            .set("height", dv)
            .set("fill", drop_order_color(p.drop_order).to_string())
            .set("fill-opacity", options.fill_opacity)
            .set("stroke", "black")
            .set("stroke-width", sw)
            .add(title);
        group = group.add(rect);

        if options.draw_ids {
            let font_size = 0.3 * f64::min(du, dv);
            let text = Text::new(p.id.to_string())
                .set("x", ox + u + 0.5 * du)
                .set("y", oy + v + 0.5 * dv)
                .set("font-size", font_size)
                .set("font-family", "monospace")
                .set("text-anchor", "middle")
                .set("dominant-baseline", "middle");
            group = group.add(text);
        }
    }
    group
}
