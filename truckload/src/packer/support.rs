use crate::EPS;
use crate::entities::Placement;
use crate::geometry::Rect;
use crate::util::{SupportConfig, SupportRule};

/// Decides whether a footprint at a given height rests sufficiently on the placements below it.
#[derive(Clone, Copy, Debug)]
pub struct Support<'a> {
    /// Placements that can act as a base
    pub placed: &'a [Placement],
    pub requirement: &'a SupportConfig,
    pub rule: SupportRule,
    pub allow_stacking_on_fragile: bool,
}

impl Support<'_> {
    /// Validates a candidate `footprint` at height `z` for an item of `weight` kg.
    ///
    /// Anything on the floor is supported. Above the floor, the footprint area resting on placements
    /// whose top is (within tolerance) at `z` has to reach the required fraction for the weight class.
    /// If it does not, the candidate is still accepted when its center rests on a placement
    /// and the contact area reaches a smaller share of the requirement.
    pub fn holds(&self, footprint: &Rect, z: f64, weight: f64) -> bool {
        if z <= EPS {
            return true;
        }
        if !self.allow_stacking_on_fragile && self.rests_on_fragile(footprint, z) {
            return false;
        }

        let needed = footprint.area() * self.requirement.required_fraction(weight);
        let mut contact = 0.0;
        for q in self.tops_near(z, self.rule.contact_tolerance) {
            contact += q.footprint().overlap_area(footprint);
            if contact + EPS >= needed {
                return true;
            }
        }

        let center = footprint.centroid();
        let center_supported = self
            .tops_near(z, self.rule.center_tolerance)
            .any(|q| q.footprint().contains_point(center));

        center_supported && contact >= needed * self.rule.center_fallback_fraction
    }

    fn tops_near(&self, z: f64, tolerance: f64) -> impl Iterator<Item = &Placement> {
        self.placed
            .iter()
            .filter(move |q| (q.top() - z).abs() <= tolerance)
    }

    fn rests_on_fragile(&self, footprint: &Rect, z: f64) -> bool {
        self.tops_near(z, self.rule.contact_tolerance)
            .any(|q| q.fragile && q.footprint().overlap_area(footprint) > EPS)
    }
}
