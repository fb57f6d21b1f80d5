mod config;
mod runs;
mod sample;
mod squares;
mod state;
mod traverse;
mod types;

pub use config::Config;
pub use types::{ComputeStats, Run, Square};

use crate::error::PlotResult;
use crate::geom::Rect;
use state::State;
use std::time::Instant;

/// Adaptive sampling engine for a function `f : (f64, f64) -> V` treated as
/// locally constant over a rectangular domain. One instance owns one
/// function and the tree produced by the most recent [`compute`].
///
/// [`compute`]: Plot::compute
pub struct Plot<F, V> {
    f: F,
    config: Config,
    state: Option<State<V>>,
    stats: ComputeStats,
}

impl<F, V> std::fmt::Debug for Plot<F, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plot")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<F, V> Plot<F, V>
where
    F: FnMut(f64, f64) -> V,
    V: Copy + PartialEq,
{
    pub fn new(f: F) -> Self {
        Self::new_with_config(f, Config::default())
    }

    pub fn new_with_config(f: F, config: Config) -> Self {
        Self {
            f,
            config,
            state: None,
            stats: ComputeStats::default(),
        }
    }

    /// Sample `f` over `domain` at the given resolution, refining near value
    /// boundaries. Samples from the previous compute are carried forward
    /// when the spacings match and the domains overlap.
    pub fn compute(
        &mut self,
        domain: Rect,
        sample_spacing: f64,
        pixel_size: f64,
    ) -> PlotResult<&mut Self> {
        let start = Instant::now();
        let mut next = State::new(
            domain,
            sample_spacing,
            pixel_size,
            self.config.store_capacity,
        )?;
        let mut new_calls = 0usize;
        let mut new_area = 0.0f64;
        if let Some(prev) = self.state.as_ref() {
            if next.can_reuse(prev) {
                next.carry_forward(prev);
            }
        }
        next.sample_grid(&mut self.f, &mut new_calls, &mut new_area);
        if next.pixel_size < next.sample_spacing {
            next.refine(&mut self.f, &mut new_calls);
        } else {
            next.queue.clear();
        }
        self.stats = ComputeStats {
            size: next.nodes.len(),
            new_calls,
            new_area,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        if self.config.profile_summary {
            println!(
                "quadplot: {} nodes, {} new samples, {} px newly covered, {:.3} ms",
                self.stats.size, self.stats.new_calls, self.stats.new_area, self.stats.elapsed_ms
            );
        }
        self.state = Some(next);
        Ok(self)
    }

    /// Aligned domain actually covered; zero rectangle before the first
    /// compute.
    pub fn domain(&self) -> Rect {
        self.state.as_ref().map(|s| s.domain).unwrap_or_default()
    }

    pub fn pixel_size(&self) -> f64 {
        self.state.as_ref().map(|s| s.pixel_size).unwrap_or(0.0)
    }

    pub fn sample_spacing(&self) -> f64 {
        self.state.as_ref().map(|s| s.sample_spacing).unwrap_or(0.0)
    }

    pub fn compute_stats(&self) -> ComputeStats {
        self.stats
    }

    /// Compressed tiling: uniform subtrees merge into a single square.
    /// Merge results are cached on the tree, so repeated calls are cheap.
    pub fn squares(&mut self) -> Vec<Square<V>> {
        match self.state.as_mut() {
            Some(state) => state.squares(),
            None => Vec::new(),
        }
    }

    /// Every leaf as its own square, in unspecified order.
    pub fn leaves(&self) -> Vec<Square<V>> {
        match self.state.as_ref() {
            Some(state) => state.leaves(),
            None => Vec::new(),
        }
    }

    /// Value-constant horizontal segments, one pixel row tall, sorted by
    /// `(y, x0)`.
    pub fn runs(&self) -> Vec<Run<V>> {
        match self.state.as_ref() {
            Some(state) => state.runs(),
            None => Vec::new(),
        }
    }
}
