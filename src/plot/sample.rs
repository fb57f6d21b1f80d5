use super::state::State;
use super::types::Node;

/// Fate of a previous-state coarse cell under carry-forward.
enum Carry {
    Drop,
    /// Keep only the cell root, coerced back to a leaf.
    Reset,
    Keep {
        reexamine: bool,
    },
}

impl<V: Copy + PartialEq> State<V> {
    /// Coarse grid pass: ensure a sample-spacing node exists at every grid
    /// center, visiting rows in row-major order (y outer). Cells already
    /// present were transplanted by [`carry_forward`] and are left alone;
    /// the rest evaluate `f` once and join the refinement queue.
    ///
    /// [`carry_forward`]: State::carry_forward
    pub(crate) fn sample_grid<F>(&mut self, f: &mut F, new_calls: &mut usize, new_area: &mut f64)
    where
        F: FnMut(f64, f64) -> V,
    {
        let s = self.sample_spacing;
        let (nx, ny) = self.grid_dims();
        let cell_pixels = (s / self.pixel_size) * (s / self.pixel_size);
        for j in 0..ny {
            let y = self.domain.y + (j as f64 + 0.5) * s;
            for i in 0..nx {
                let x = self.domain.x + (i as f64 + 0.5) * s;
                let key = self.key_at(x, y);
                if self.nodes.contains_key(&key) {
                    continue;
                }
                let value = f(x, y);
                *new_calls += 1;
                *new_area += cell_pixels;
                self.nodes.insert(key, Node::new_leaf(x, y, s, value));
                self.queue.push(key);
            }
        }
    }

    /// Migrate the previous state's nodes into this one. The previous store
    /// is walked in full and every surviving node is reinserted under its
    /// key in the new state's keying.
    pub(crate) fn carry_forward(&mut self, prev: &State<V>) {
        let s = self.sample_spacing;
        for node in prev.nodes.values() {
            let cell_x = Self::snap(node.x, s);
            let cell_y = Self::snap(node.y, s);
            match self.classify_cell(prev, cell_x, cell_y) {
                Carry::Drop => {}
                Carry::Reset => {
                    if node.size == s {
                        let mut root = *node;
                        root.leaf = true;
                        root.uniform = None;
                        let key = self.key_at(root.x, root.y);
                        self.nodes.insert(key, root);
                        self.queue.push(key);
                    }
                }
                Carry::Keep { reexamine } => {
                    let key = self.key_at(node.x, node.y);
                    self.nodes.insert(key, *node);
                    if reexamine && node.leaf {
                        self.queue.push(key);
                    }
                }
            }
        }
    }

    /// Cells fully inside the new domain survive. A cell beside ground the
    /// previous state never sampled restarts at coarse size, so refinement
    /// regrows jointly on both sides of the seam and stays balanced. A cell
    /// beside ground the previous state covered but this one does not keeps
    /// its refinement and is re-examined against the surviving neighbors.
    fn classify_cell(&self, prev: &State<V>, cell_x: f64, cell_y: f64) -> Carry {
        if !self.center_in_domain(cell_x, cell_y) {
            return Carry::Drop;
        }
        let s = self.sample_spacing;
        let mut reexamine = false;
        for (dx, dy) in [(s, 0.0), (-s, 0.0), (0.0, s), (0.0, -s)] {
            let nx = cell_x + dx;
            let ny = cell_y + dy;
            let in_new = self.center_in_domain(nx, ny);
            let in_old = prev.center_in_domain(nx, ny);
            if in_new && !in_old {
                return Carry::Reset;
            }
            if in_old && !in_new {
                reexamine = true;
            }
        }
        Carry::Keep { reexamine }
    }
}
