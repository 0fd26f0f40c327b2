use crate::EPS;
use crate::geometry::Rect;
use crate::geometry::geo_traits::{CollidesWith, Encloses};
use itertools::Itertools;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Unique key for each free rectangle in a [`FreeRectArena`]
    pub struct FreeRectKey;
}

/// Unused floor area of a single layer, as a set of (possibly overlapping) maximal rectangles.
///
/// Every rectangle in the arena is disjoint from all footprints placed through [`FreeRectArena::occupy`].
/// All cleanup operations produce a new arena instead of mutating the rectangles in place.
/// Iteration follows insertion order, which makes best-fit tie-breaking deterministic.
#[derive(Clone, Debug)]
pub struct FreeRectArena {
    rects: SlotMap<FreeRectKey, Rect>,
}

impl FreeRectArena {
    /// Arena spanning the entire `floor`
    pub fn new(floor: Rect) -> Self {
        Self::from_rects([floor])
    }

    fn from_rects(rects: impl IntoIterator<Item = Rect>) -> Self {
        let mut arena = SlotMap::with_key();
        for r in rects {
            arena.insert(r);
        }
        Self { rects: arena }
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn get(&self, key: FreeRectKey) -> Option<&Rect> {
        self.rects.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FreeRectKey, &Rect)> {
        self.rects.iter()
    }

    /// The free rectangle which can hold a `length` x `width` footprint with the least leftover area.
    /// The first one in insertion order wins ties.
    pub fn best_fit(&self, length: f64, width: f64) -> Option<FreeRectKey> {
        let needed = length * width;
        let mut best: Option<(FreeRectKey, f64)> = None;
        for (key, r) in self.rects.iter() {
            if r.fits(length, width) {
                let leftover = r.area() - needed;
                if best.is_none_or(|(_, best_leftover)| leftover < best_leftover) {
                    best = Some((key, leftover));
                }
            }
        }
        best.map(|(key, _)| key)
    }

    /// Occupies a `length` x `width` footprint at the origin of the free rectangle `key`.
    ///
    /// The chosen rectangle is split in a remainder to the right of the footprint and one above it,
    /// both spanning the full extent of the original rectangle.
    /// Every other rectangle that intersects the footprint is replaced by its uncovered parts.
    /// Returns the occupied footprint and the cleaned arena.
    pub fn occupy(&self, key: FreeRectKey, length: f64, width: f64) -> (Rect, FreeRectArena) {
        let chosen = self.rects[key];
        let footprint = Rect::from_origin(chosen.x_min, chosen.y_min, length, width);

        let remainders = [
            Rect::non_degenerate(footprint.x_max, chosen.y_min, chosen.x_max, chosen.y_max),
            Rect::non_degenerate(chosen.x_min, footprint.y_max, chosen.x_max, chosen.y_max),
        ];

        let mut rects = vec![];
        for (k, r) in self.rects.iter() {
            if k == key {
                continue;
            }
            match r.collides_with(&footprint) {
                true => rects.extend(r.subtract(&footprint)),
                false => rects.push(*r),
            }
        }
        rects.extend(remainders.into_iter().flatten());

        (footprint, Self::from_rects(remove_enclosed(rects)))
    }

    /// Returns a new arena in which adjacent rectangles sharing a full edge are merged, until no more merges are possible.
    pub fn merged(&self) -> FreeRectArena {
        let mut rects = self.rects.values().copied().collect_vec();
        loop {
            let (merged, changed) = merge_pass(&rects);
            rects = merged;
            if !changed {
                break;
            }
        }
        Self::from_rects(rects)
    }

    /// Area of the largest free rectangle, 0 if there are none
    pub fn largest_area(&self) -> f64 {
        self.rects.values().map(|r| r.area()).fold(0.0, f64::max)
    }
}

/// Removes every rectangle that is enclosed by another one.
/// Of a group of identical rectangles, the first one is kept.
fn remove_enclosed(rects: Vec<Rect>) -> Vec<Rect> {
    rects
        .iter()
        .enumerate()
        .filter(|&(i, a)| {
            !rects.iter().enumerate().any(|(j, b)| {
                i != j && b.encloses(a) && (!a.encloses(b) || j < i)
            })
        })
        .map(|(_, a)| *a)
        .collect_vec()
}

/// A single sweep that greedily grows every unused rectangle with all unused neighbours that share a full edge.
fn merge_pass(rects: &[Rect]) -> (Vec<Rect>, bool) {
    let mut used = vec![false; rects.len()];
    let mut out = Vec::with_capacity(rects.len());
    let mut changed = false;
    for i in 0..rects.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut m = rects[i];
        for (j, b) in rects.iter().enumerate() {
            if used[j] {
                continue;
            }
            //same y-extent, adjacent along x
            if (m.y_min - b.y_min).abs() < EPS && (m.width() - b.width()).abs() < EPS {
                if (m.x_max - b.x_min).abs() < EPS {
                    m.x_max = b.x_max;
                    used[j] = true;
                    changed = true;
                    continue;
                } else if (b.x_max - m.x_min).abs() < EPS {
                    m.x_min = b.x_min;
                    used[j] = true;
                    changed = true;
                    continue;
                }
            }
            //same x-extent, adjacent along y
            if (m.x_min - b.x_min).abs() < EPS && (m.length() - b.length()).abs() < EPS {
                if (m.y_max - b.y_min).abs() < EPS {
                    m.y_max = b.y_max;
                    used[j] = true;
                    changed = true;
                } else if (b.y_max - m.y_min).abs() < EPS {
                    m.y_min = b.y_min;
                    used[j] = true;
                    changed = true;
                }
            }
        }
        out.push(m);
    }
    (out, changed)
}
