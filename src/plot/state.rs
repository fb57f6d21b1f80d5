use super::types::Node;
use crate::error::{PlotError, PlotResult};
use crate::geom::{self, Rect};
use fxhash::FxHashMap;

/// 2^53, the range over which f64 key arithmetic on admissible centers is
/// exact.
pub(crate) const KEY_LIMIT: f64 = 9_007_199_254_740_992.0;

/// One computation's tree: an integer-keyed node store plus the immutable
/// keying parameters. `key(x, y) = floor(c0 + cx*x + cy*y)` is injective on
/// admissible `(x, y, size)` triples inside the aligned domain, so neighbor
/// lookups across tree levels are single map probes.
pub(crate) struct State<V> {
    pub(crate) nodes: FxHashMap<i64, Node<V>>,
    pub(crate) domain: Rect,
    pub(crate) sample_spacing: f64,
    pub(crate) pixel_size: f64,
    cx: f64,
    cy: f64,
    c0: f64,
    /// LIFO queue of node keys pending a neighbor check.
    pub(crate) queue: Vec<i64>,
}

impl<V: Copy + PartialEq> State<V> {
    pub(crate) fn new(
        domain: Rect,
        sample_spacing: f64,
        pixel_size: f64,
        capacity: usize,
    ) -> PlotResult<Self> {
        geom::validate_spacings(sample_spacing, pixel_size)?;
        geom::validate_domain_dims(domain.width, domain.height)?;
        let pixel_size = if pixel_size > sample_spacing {
            sample_spacing
        } else {
            pixel_size
        };
        let domain = domain.aligned_outward(sample_spacing);
        let cx = 2.0 / pixel_size;
        let cy = cx * (domain.width / pixel_size);
        let c0 = -cx * domain.x - cy * domain.y;
        if c0.abs() > KEY_LIMIT / 2.0 {
            return Err(PlotError::KeyRangeOverflow {
                offset: c0,
                limit: KEY_LIMIT / 2.0,
            });
        }
        Ok(Self {
            nodes: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            domain,
            sample_spacing,
            pixel_size,
            cx,
            cy,
            c0,
            queue: Vec::new(),
        })
    }

    #[inline]
    pub(crate) fn key_at(&self, x: f64, y: f64) -> i64 {
        (self.c0 + self.cx * x + self.cy * y).floor() as i64
    }

    /// Center of the `size`-aligned cell containing `coord`.
    #[inline]
    pub(crate) fn snap(coord: f64, size: f64) -> f64 {
        ((coord / size).floor() + 0.5) * size
    }

    /// Key uniqueness only holds for centers inside the aligned domain;
    /// probes outside it must be treated as misses without touching the
    /// store.
    #[inline]
    pub(crate) fn center_in_domain(&self, x: f64, y: f64) -> bool {
        x > self.domain.x
            && x < self.domain.right()
            && y > self.domain.y
            && y < self.domain.bottom()
    }

    #[inline]
    pub(crate) fn grid_dims(&self) -> (usize, usize) {
        let s = self.sample_spacing;
        (
            (self.domain.width / s).round() as usize,
            (self.domain.height / s).round() as usize,
        )
    }

    pub(crate) fn can_reuse(&self, prev: &State<V>) -> bool {
        self.sample_spacing == prev.sample_spacing
            && self.pixel_size == prev.pixel_size
            && self.domain.overlap_area(&prev.domain) > 0.0
    }
}
