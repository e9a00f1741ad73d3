//! SVG drawing of a solved belt.
//!
//! Every pulley gets, from back to front: a torque disc, the pulley disc, the
//! arc the belt wraps, the straight run to the next pulley, the bearing
//! reaction arrow and an index label. The drawing uses the belt's own
//! coordinates with the y axis pointing up.

mod color;

use beltpath_core::{Belt, DisplayScale, Forces, Geometry, Point, Pulley, cyclic};
use std::{
    f64::consts::{FRAC_PI_2, TAU},
    io,
    path::Path,
};
use svg::{
    Document, Node,
    node::element::{Circle, Group, Line, Polyline, Text},
};

pub use color::{hex, hsv_to_rgb, hue};

/// Straight segments used to draw a full circle of belt.
pub const CIRCLE_RESOLUTION: usize = 50;
pub const LINE_WIDTH: f64 = 2.0;

const TORQUE_CW: &str = "#d9d9ff";
const TORQUE_CCW: &str = "#ffd9d9";
const PULLEY_FILL: &str = "#cccccc";

#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    pub show_pulleys: bool,
    pub show_labels: bool,
    pub show_reaction: bool,
    pub show_torque: bool,
    pub circle_resolution: usize,
    /// Stroke width in screen pixels.
    pub line_width: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_pulleys: true,
            show_labels: true,
            show_reaction: true,
            show_torque: true,
            circle_resolution: CIRCLE_RESOLUTION,
            line_width: LINE_WIDTH,
        }
    }
}

impl RenderOptions {
    fn needs_forces(&self) -> bool {
        self.show_reaction || self.show_torque
    }
}

/// Draw `belt`, solving its forces first when the options need them.
pub fn render_belt(belt: &mut Belt, options: &RenderOptions) -> beltpath_core::Result<Document> {
    let scale = belt.display_scale();
    if options.needs_forces() {
        belt.forces()?;
    }
    Ok(render(
        belt.pulleys(),
        belt.geometry(),
        belt.cached_forces(),
        scale,
        options,
    ))
}

/// Draw a belt from its parts.
///
/// Without `forces` the reaction arrows are skipped and torque discs show
/// the stored pulley torques.
pub fn render(
    pulleys: &[Pulley],
    geometry: &Geometry,
    forces: Option<&Forces>,
    scale: DisplayScale,
    options: &RenderOptions,
) -> Document {
    let n = pulleys.len();
    let mut bounds = Bounds::default();
    let mut layers: [Group; 5] = std::array::from_fn(|_| Group::new());

    for (i, p) in pulleys.iter().enumerate() {
        let Some(seg) = geometry.segment(i) else {
            break;
        };
        let center = p.center();
        let r = p.radius();
        let dir = p.direction().sign();
        bounds.include_circle(center, r);

        // 1. torque
        if options.show_torque {
            let torque = forces
                .and_then(|f| f.torque_of(pulleys, i))
                .unwrap_or(p.torque());
            let mut tr = torque.abs() * scale.torque;
            if options.show_pulleys {
                tr += r;
            }
            if tr > 0.0 {
                bounds.include_circle(center, tr);
                let fill = if torque >= 0.0 { TORQUE_CW } else { TORQUE_CCW };
                layers[0].append(disc(center, tr, fill));
            }
        }

        // 2. pulley
        if options.show_pulleys {
            layers[1].append(disc(center, r, PULLEY_FILL));
        }

        // 3. wrap arc, from the incoming contact back against the belt travel
        let k = cyclic::prev(i, n);
        let Some(incoming) = geometry.segment(k) else {
            break;
        };
        let start = incoming.global_tangent_angle + dir * FRAC_PI_2;
        let steps =
            ((seg.wrap_angle * options.circle_resolution as f64 / TAU) as usize + 1).max(2);
        let points: Vec<Point> = (0..steps)
            .map(|s| {
                let t = start - dir * seg.wrap_angle * s as f64 / (steps - 1) as f64;
                center.polar_offset(r, t)
            })
            .collect();
        layers[2].append(
            Polyline::new()
                .set("points", points_attr(&points))
                .set("fill", "none")
                .set("stroke", hue(i as f64 / n as f64))
                .set("stroke-width", options.line_width)
                .set("vector-effect", "non-scaling-stroke"),
        );

        // 4. straight run to the next pulley
        if let Some(next) = geometry.segment(cyclic::next(i, n)) {
            layers[2].append(
                line(seg.contact_out, next.contact_in)
                    .set("stroke", hue((i as f64 + 0.5) / n as f64))
                    .set("stroke-width", options.line_width)
                    .set("vector-effect", "non-scaling-stroke"),
            );
        }

        // 5. reaction, drawn from the rim outwards
        let reaction = forces
            .and_then(|f| f.segment(i))
            .filter(|_| options.show_reaction);
        if let Some(reaction) = reaction {
            let a = reaction.reaction_angle;
            let from = center.polar_offset(r, a);
            let to = from.polar_offset(scale.force * reaction.reaction_force, a);
            bounds.include(to);
            layers[3].append(
                line(from, to)
                    .set("stroke", "black")
                    .set("stroke-width", options.line_width)
                    .set("vector-effect", "non-scaling-stroke"),
            );
        }
    }

    // 6. labels, sized against the whole drawing
    let (min_x, min_y, width, height) = bounds.view_box();
    if options.show_labels {
        let font_size = 0.03 * width.max(height);
        for (i, p) in pulleys.iter().enumerate() {
            layers[4].append(
                Text::new(i.to_string())
                    .set("x", p.x())
                    .set("y", -p.y())
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "central")
                    .set("font-family", "sans-serif")
                    .set("font-size", font_size),
            );
        }
    }

    tracing::debug!(pulleys = n, width, height, "rendered belt");

    layers.into_iter().fold(
        Document::new()
            .set("viewBox", (min_x, min_y, width, height))
            .set("width", format!("{}px", (width.max(1.0)).min(1200.0).round()))
            .set("preserveAspectRatio", "xMidYMid meet"),
        |doc, layer| doc.add(layer),
    )
}

/// Write `document` to `path`.
pub fn save<P: AsRef<Path>>(path: P, document: &Document) -> io::Result<()> {
    svg::save(path, document)
}

fn disc(center: Point, r: f64, fill: &str) -> Circle {
    Circle::new()
        .set("cx", center.x)
        .set("cy", -center.y)
        .set("r", r)
        .set("fill", fill)
}

fn line(from: Point, to: Point) -> Line {
    Line::new()
        .set("x1", from.x)
        .set("y1", -from.y)
        .set("x2", to.x)
        .set("y2", -to.y)
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.4},{:.4}", p.x, -p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

// Drawing extent in SVG coordinates (y flipped).
#[derive(Debug)]
struct Bounds {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }
}

impl Bounds {
    fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(-p.y);
        self.max_y = self.max_y.max(-p.y);
    }

    fn include_circle(&mut self, center: Point, r: f64) {
        self.include(Point::new(center.x - r, center.y - r));
        self.include(Point::new(center.x + r, center.y + r));
    }

    /// `(min_x, min_y, width, height)` with a 5% margin.
    fn view_box(&self) -> (f64, f64, f64, f64) {
        if !self.min_x.is_finite() {
            return (0.0, 0.0, 1.0, 1.0);
        }
        let width = (self.max_x - self.min_x).max(f64::EPSILON);
        let height = (self.max_y - self.min_y).max(f64::EPSILON);
        let margin = 0.05 * width.max(height);
        (
            self.min_x - margin,
            self.min_y - margin,
            width + 2.0 * margin,
            height + 2.0 * margin,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beltpath_core::{Direction, ForceOptions};

    fn two_pulley_belt() -> Belt {
        Belt::new(
            vec![
                Pulley::new(10.0, 0.0, 0.0, Direction::Clockwise).unwrap(),
                Pulley::new(10.0, 100.0, 0.0, Direction::Clockwise)
                    .and_then(|p| p.with_torque(50.0))
                    .unwrap(),
            ],
            ForceOptions::with_min_tension(0, 5.0),
        )
        .unwrap()
    }

    fn count(doc: &Document, tag: &str) -> usize {
        doc.to_string().matches(&format!("<{tag} ")).count()
    }

    #[test]
    fn draws_every_layer() {
        let mut belt = two_pulley_belt();
        let doc = render_belt(&mut belt, &RenderOptions::default()).unwrap();

        // torque disc + pulley disc per pulley
        assert_eq!(count(&doc, "circle"), 4);
        assert_eq!(count(&doc, "polyline"), 2);
        // two straight runs and two reactions
        assert_eq!(count(&doc, "line"), 4);
        assert_eq!(count(&doc, "text"), 2);
    }

    #[test]
    fn toggles_remove_layers() {
        let mut belt = two_pulley_belt();
        let options = RenderOptions {
            show_pulleys: false,
            show_labels: false,
            show_reaction: false,
            show_torque: false,
            ..RenderOptions::default()
        };
        let doc = render_belt(&mut belt, &options).unwrap();
        assert_eq!(count(&doc, "circle"), 0);
        assert_eq!(count(&doc, "text"), 0);
        assert_eq!(count(&doc, "line"), 2);
        assert!(belt.cached_forces().is_none());
    }

    #[test]
    fn arcs_follow_resolution() {
        let mut belt = two_pulley_belt();
        let doc = render_belt(
            &mut belt,
            &RenderOptions {
                circle_resolution: 8,
                ..RenderOptions::default()
            },
        )
        .unwrap();
        // half a turn at 8 segments per turn: 5 points
        let text = doc.to_string();
        let points = text
            .lines()
            .find(|l| l.contains("<polyline"))
            .and_then(|l| l.split("points=\"").nth(1))
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        assert_eq!(points.split(' ').count(), 5);
    }

    #[test]
    fn unknown_pulley_disc_uses_solved_torque() {
        let mut belt = two_pulley_belt();
        belt.set_torque_scale(0.1).unwrap();
        let doc = render_belt(&mut belt, &RenderOptions::default()).unwrap();
        // the solved -50 on pulley 0 draws as a counter-clockwise disc
        assert_eq!(doc.to_string().matches(TORQUE_CCW).count(), 1);
        assert_eq!(doc.to_string().matches(TORQUE_CW).count(), 1);
    }

    #[test]
    fn negative_tension_is_reported() {
        let mut belt = Belt::new(
            vec![
                Pulley::new(10.0, 0.0, 0.0, Direction::Clockwise).unwrap(),
                Pulley::new(10.0, 100.0, 0.0, Direction::Clockwise)
                    .and_then(|p| p.with_torque(500.0))
                    .unwrap(),
            ],
            ForceOptions::with_tensioner(0, 1, 1.0),
        )
        .unwrap();
        assert!(render_belt(&mut belt, &RenderOptions::default()).is_err());
    }
}
