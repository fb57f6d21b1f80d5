use super::state::State;
use super::types::Node;
use smallvec::SmallVec;

const AXES: [(f64, f64); 4] = [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)];

impl<V: Copy + PartialEq> State<V> {
    /// Drain the refinement queue. Each popped leaf is checked against its
    /// four axis neighbors; a value disagreement subdivides the disagreeing
    /// leaf neighbor and then the node itself, pushing all new children
    /// back on the queue.
    pub(crate) fn refine<F>(&mut self, f: &mut F, new_calls: &mut usize)
    where
        F: FnMut(f64, f64) -> V,
    {
        while let Some(key) = self.queue.pop() {
            let node = match self.nodes.get(&key) {
                Some(n) if n.leaf => *n,
                // subdivided (or discarded) while queued
                _ => continue,
            };
            if node.size <= self.pixel_size {
                self.check_finest(&node, f, new_calls);
                continue;
            }
            let mut split_self = false;
            let mut disagreeing: SmallVec<[i64; 4]> = SmallVec::new();
            for (dx, dy) in AXES {
                let Some(nk) = self.neighbor_key(&node, dx, dy) else {
                    continue;
                };
                let neighbor = &self.nodes[&nk];
                if neighbor.value != node.value {
                    split_self = true;
                    if neighbor.leaf {
                        disagreeing.push(nk);
                    }
                }
            }
            for nk in disagreeing {
                // an earlier split this round may already have taken it
                if self.nodes[&nk].leaf {
                    self.subdivide(nk, f, new_calls);
                }
            }
            if split_self {
                self.subdivide(key, f, new_calls);
            }
        }
    }

    /// At pixel size the node itself cannot split; only a disagreeing
    /// coarser neighbor along each axis still reacts.
    fn check_finest<F>(&mut self, node: &Node<V>, f: &mut F, new_calls: &mut usize)
    where
        F: FnMut(f64, f64) -> V,
    {
        let size = node.size;
        let ps = size * 2.0;
        for (dx, dy) in AXES {
            let sx = node.x + dx * size;
            let sy = node.y + dy * size;
            if self.center_in_domain(sx, sy) && self.nodes.contains_key(&self.key_at(sx, sy)) {
                // same-size neighbor; nothing left to refine here
                continue;
            }
            let px = Self::snap(node.x, ps) + dx * ps;
            let py = Self::snap(node.y, ps) + dy * ps;
            if !self.center_in_domain(px, py) {
                continue;
            }
            let nk = self.key_at(px, py);
            let Some(neighbor) = self.nodes.get(&nk) else {
                continue;
            };
            if neighbor.leaf && neighbor.value != node.value {
                self.subdivide(nk, f, new_calls);
            }
        }
    }

    /// Same-size neighbor along one axis, falling back one level coarser.
    /// An empty same-size slot means the neighbor, if any, is larger: a node
    /// is only absent when its whole parent quadrant never split.
    fn neighbor_key(&self, node: &Node<V>, dx: f64, dy: f64) -> Option<i64> {
        let size = node.size;
        let sx = node.x + dx * size;
        let sy = node.y + dy * size;
        if self.center_in_domain(sx, sy) {
            let key = self.key_at(sx, sy);
            if self.nodes.contains_key(&key) {
                return Some(key);
            }
        }
        let ps = size * 2.0;
        let px = Self::snap(node.x, ps) + dx * ps;
        let py = Self::snap(node.y, ps) + dy * ps;
        if !self.center_in_domain(px, py) {
            return None;
        }
        let key = self.key_at(px, py);
        self.nodes.contains_key(&key).then_some(key)
    }

    /// Replace a leaf with its four quadrant children, evaluating `f` once
    /// per child. A coarser leaf on either parent-exterior side is split
    /// first; without that the new children would sit two levels below it.
    pub(crate) fn subdivide<F>(&mut self, key: i64, f: &mut F, new_calls: &mut usize)
    where
        F: FnMut(f64, f64) -> V,
    {
        let node = self.nodes[&key];
        if !node.leaf {
            return;
        }
        let size = node.size;
        debug_assert!(size > self.pixel_size);
        if size < self.sample_spacing {
            let ps = size * 2.0;
            let px = Self::snap(node.x, ps);
            let py = Self::snap(node.y, ps);
            let out_x = if node.x < px { -1.0 } else { 1.0 };
            let out_y = if node.y < py { -1.0 } else { 1.0 };
            for (dx, dy) in [(out_x, 0.0), (0.0, out_y)] {
                let sx = node.x + dx * size;
                let sy = node.y + dy * size;
                if self.center_in_domain(sx, sy) && self.nodes.contains_key(&self.key_at(sx, sy)) {
                    continue;
                }
                let nx = px + dx * ps;
                let ny = py + dy * ps;
                if !self.center_in_domain(nx, ny) {
                    continue;
                }
                let nk = self.key_at(nx, ny);
                if let Some(neighbor) = self.nodes.get(&nk) {
                    if neighbor.leaf {
                        self.subdivide(nk, f, new_calls);
                    }
                }
            }
        }
        {
            let n = self
                .nodes
                .get_mut(&key)
                .expect("subdividing node must be present");
            n.leaf = false;
            n.uniform = None;
        }
        self.invalidate_uniform_above(node.x, node.y, size);
        let half = size * 0.5;
        let q = size * 0.25;
        for (ox, oy) in [(-q, -q), (q, -q), (-q, q), (q, q)] {
            let cx = node.x + ox;
            let cy = node.y + oy;
            let value = f(cx, cy);
            *new_calls += 1;
            let ck = self.key_at(cx, cy);
            self.nodes.insert(ck, Node::new_leaf(cx, cy, half, value));
            self.queue.push(ck);
        }
    }

    // Compression caches are stale the moment a subtree regrows. Cached
    // ancestors form a contiguous chain, so the walk stops at the first
    // uncached one.
    fn invalidate_uniform_above(&mut self, x: f64, y: f64, size: f64) {
        let mut s = size;
        while s < self.sample_spacing {
            s *= 2.0;
            let key = self.key_at(Self::snap(x, s), Self::snap(y, s));
            match self.nodes.get_mut(&key) {
                Some(parent) if parent.uniform.is_some() => parent.uniform = None,
                _ => break,
            }
        }
    }
}
