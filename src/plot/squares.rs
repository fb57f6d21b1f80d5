use super::state::State;
use super::types::Square;

/// Result of merging one subtree: either every leaf below agreed on a
/// value, or the subtree stays split.
enum Collected<V> {
    Uniform(V),
    NonUniform,
}

impl<V: Copy + PartialEq> State<V> {
    /// Compressed tiling. Each coarse root is merged bottom-up; uniform
    /// subtrees come out as a single square and are cached on their root so
    /// the next extraction skips the descent.
    pub(crate) fn squares(&mut self) -> Vec<Square<V>> {
        let mut out = Vec::new();
        let s = self.sample_spacing;
        let (nx, ny) = self.grid_dims();
        for j in 0..ny {
            let y = self.domain.y + (j as f64 + 0.5) * s;
            for i in 0..nx {
                let x = self.domain.x + (i as f64 + 0.5) * s;
                let key = self.key_at(x, y);
                if !self.nodes.contains_key(&key) {
                    continue;
                }
                if let Collected::Uniform(value) = self.collect(key, &mut out) {
                    out.push(Square {
                        x,
                        y,
                        size: s,
                        value,
                    });
                }
            }
        }
        out
    }

    fn collect(&mut self, key: i64, out: &mut Vec<Square<V>>) -> Collected<V> {
        let node = self.nodes[&key];
        if node.leaf {
            return Collected::Uniform(node.value);
        }
        if let Some(value) = node.uniform {
            return Collected::Uniform(value);
        }
        let q = node.size * 0.25;
        let half = node.size * 0.5;
        let mut centers = [(0.0f64, 0.0f64); 4];
        let mut collected: [Option<V>; 4] = [None; 4];
        for (slot, (ox, oy)) in [(-q, -q), (q, -q), (-q, q), (q, q)].into_iter().enumerate() {
            let cx = node.x + ox;
            let cy = node.y + oy;
            centers[slot] = (cx, cy);
            let child_key = self.key_at(cx, cy);
            collected[slot] = match self.collect(child_key, out) {
                Collected::Uniform(v) => Some(v),
                Collected::NonUniform => None,
            };
        }
        let unanimous = match collected {
            [Some(a), Some(b), Some(c), Some(d)] if a == b && a == c && a == d => Some(a),
            _ => None,
        };
        if let Some(value) = unanimous {
            self.nodes
                .get_mut(&key)
                .expect("collected node must be present")
                .uniform = Some(value);
            return Collected::Uniform(value);
        }
        // the split stops here: emit whichever quadrants merged on their own
        for (slot, (cx, cy)) in centers.into_iter().enumerate() {
            if let Some(value) = collected[slot] {
                out.push(Square {
                    x: cx,
                    y: cy,
                    size: half,
                    value,
                });
            }
        }
        Collected::NonUniform
    }

    /// Every leaf as its own square, in unspecified order.
    pub(crate) fn leaves(&self) -> Vec<Square<V>> {
        self.nodes
            .values()
            .filter(|n| n.leaf)
            .map(|n| Square {
                x: n.x,
                y: n.y,
                size: n.size,
                value: n.value,
            })
            .collect()
    }
}
