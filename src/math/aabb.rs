use glam::DVec3;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct AABB {
    pub min: DVec3,
    pub max: DVec3,
}

impl AABB {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Tightest box around `points`, or `None` when there are no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec3>) -> Option<AABB> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(AABB::new(first, first), |acc, &p| AABB {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Span of the longest axis.
    pub fn max_extent(&self) -> f64 {
        self.size().max_element()
    }
}
