use crate::EPS;
use crate::geometry::geo_traits::{CollidesWith, Encloses};
use anyhow::Result;
use anyhow::ensure;

///Axis-aligned rectangle in the floor plane of the truck
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Rect {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Rect {
    pub fn try_new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self> {
        ensure!(
            x_min < x_max && y_min < y_max,
            "invalid rectangle, x_min: {x_min}, x_max: {x_max}, y_min: {y_min}, y_max: {y_max}"
        );
        Ok(Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Rectangle with its bottom-left corner at `(x, y)`, spanning `length` along x and `width` along y.
    pub fn from_origin(x: f64, y: f64, length: f64, width: f64) -> Self {
        Rect {
            x_min: x,
            y_min: y,
            x_max: x + length,
            y_max: y + width,
        }
    }

    /// Returns the rectangle only if both sides are longer than [`EPS`].
    pub fn non_degenerate(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Option<Self> {
        match x_max - x_min > EPS && y_max - y_min > EPS {
            true => Some(Rect {
                x_min,
                y_min,
                x_max,
                y_max,
            }),
            false => None,
        }
    }

    /// Extent along the x-axis
    pub fn length(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Extent along the y-axis
    pub fn width(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn area(&self) -> f64 {
        self.length() * self.width()
    }

    pub fn centroid(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// True if a footprint of `length` x `width` fits inside `self` without rotating it.
    pub fn fits(&self, length: f64, width: f64) -> bool {
        length <= self.length() + EPS && width <= self.width() + EPS
    }

    /// Returns the largest rectangle that is contained in both `a` and `b`.
    pub fn intersection(a: Rect, b: Rect) -> Option<Rect> {
        let x_min = f64::max(a.x_min, b.x_min);
        let y_min = f64::max(a.y_min, b.y_min);
        let x_max = f64::min(a.x_max, b.x_max);
        let y_max = f64::min(a.y_max, b.y_max);
        if x_min < x_max && y_min < y_max {
            Some(Rect {
                x_min,
                y_min,
                x_max,
                y_max,
            })
        } else {
            None
        }
    }

    /// Area shared by `self` and `other`, zero if they are disjoint or only touch.
    pub fn overlap_area(&self, other: &Rect) -> f64 {
        Rect::intersection(*self, *other).map_or(0.0, |r| r.area())
    }

    /// Half-open point containment, with the tolerance applied on both ends:
    /// `x_min - EPS <= x < x_max + EPS` (idem for y).
    pub fn contains_point(&self, (x, y): (f64, f64)) -> bool {
        self.x_min - EPS <= x && x < self.x_max + EPS && self.y_min - EPS <= y && y < self.y_max + EPS
    }

    /// The parts of `self` that are not covered by `cut`, as maximal rectangles
    /// (left, right, below and above `cut`). These may overlap each other.
    pub fn subtract(&self, cut: &Rect) -> impl Iterator<Item = Rect> + use<> {
        let r = *self;
        [
            Rect::non_degenerate(r.x_min, r.y_min, cut.x_min, r.y_max),
            Rect::non_degenerate(cut.x_max, r.y_min, r.x_max, r.y_max),
            Rect::non_degenerate(r.x_min, r.y_min, r.x_max, cut.y_min),
            Rect::non_degenerate(r.x_min, cut.y_max, r.x_max, r.y_max),
        ]
        .into_iter()
        .flatten()
    }
}

impl CollidesWith<Rect> for Rect {
    #[inline(always)]
    fn collides_with(&self, other: &Rect) -> bool {
        f64::max(self.x_min, other.x_min) + EPS < f64::min(self.x_max, other.x_max)
            && f64::max(self.y_min, other.y_min) + EPS < f64::min(self.y_max, other.y_max)
    }
}

impl Encloses<Rect> for Rect {
    #[inline(always)]
    fn encloses(&self, other: &Rect) -> bool {
        other.x_min >= self.x_min - EPS
            && other.y_min >= self.y_min - EPS
            && other.x_max <= self.x_max + EPS
            && other.y_max <= self.y_max + EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn overlap_area_of_shifted_squares() {
        let a = Rect::from_origin(0.0, 0.0, 1.0, 1.0);
        let b = Rect::from_origin(0.5, 0.75, 1.0, 1.0);
        assert!(approx_eq!(f64, a.overlap_area(&b), 0.125, epsilon = 1e-12));
        assert!(a.collides_with(&b));
    }

    #[test]
    fn touching_rects_neither_overlap_nor_collide() {
        let a = Rect::from_origin(0.0, 0.0, 1.0, 1.0);
        let b = Rect::from_origin(1.0, 0.0, 1.0, 1.0);
        assert_eq!(a.overlap_area(&b), 0.0);
        assert!(!a.collides_with(&b));
    }

    #[test]
    fn point_containment_is_half_open() {
        let r = Rect::from_origin(0.0, 0.0, 1.0, 1.0);
        assert!(r.contains_point((0.0, 0.0)));
        assert!(r.contains_point((0.5, 0.999)));
        assert!(!r.contains_point((1.0 + 2.0 * EPS, 0.5)));
    }

    #[test]
    fn subtract_central_cut_leaves_four_strips() {
        let r = Rect::from_origin(0.0, 0.0, 3.0, 3.0);
        let cut = Rect::from_origin(1.0, 1.0, 1.0, 1.0);
        let pieces: Vec<Rect> = r.subtract(&cut).collect();
        assert_eq!(pieces.len(), 4);
        assert!(pieces.iter().all(|p| !p.collides_with(&cut)));
        assert!(pieces.iter().all(|p| r.encloses(p)));
    }

    #[test]
    fn subtract_corner_cut_leaves_two_strips() {
        let r = Rect::from_origin(0.0, 0.0, 3.0, 2.0);
        let cut = Rect::from_origin(0.0, 0.0, 1.0, 1.0);
        let pieces: Vec<Rect> = r.subtract(&cut).collect();
        assert_eq!(
            pieces,
            vec![
                Rect::from_origin(1.0, 0.0, 2.0, 2.0),
                Rect::from_origin(0.0, 1.0, 3.0, 1.0)
            ]
        );
    }
}
