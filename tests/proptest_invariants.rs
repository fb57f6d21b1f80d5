//! Property-based invariant tests for the sampling engine.
//!
//! Verifies, for arbitrary half-plane functions, domains and spacings:
//! 1. Leaves tile the aligned domain exactly once
//! 2. Edge-adjacent leaves differ in size by at most a factor of two
//! 3. Every leaf value is the sample of `f` at the leaf center
//! 4. Runs cover every pixel row back to back with no gaps
//! 5. Compressed tiles never hide a dissenting leaf
//! 6. Recomputing identical parameters evaluates `f` zero times
//! 7. Recomputing over a contained domain reports no new area
//! 8. Random pan sequences keep runs and coverage intact throughout

use proptest::prelude::*;
use quadplot::{Plot, Rect, Run, Square};

#[derive(Debug, Clone, Copy)]
struct HalfPlane {
    a: f64,
    b: f64,
    c: f64,
}

impl HalfPlane {
    fn eval(self, x: f64, y: f64) -> bool {
        self.a * x + self.b * y < self.c
    }
}

fn arb_half_plane() -> impl Strategy<Value = HalfPlane> {
    (-3..=3i32, -3..=3i32, -8..=8i32).prop_map(|(a, b, c)| HalfPlane {
        a: a as f64,
        b: b as f64,
        c: c as f64 * 0.5,
    })
}

fn arb_domain() -> impl Strategy<Value = Rect> {
    (-8..=8i32, -8..=8i32, 1..=5i32, 1..=5i32)
        .prop_map(|(x, y, w, h)| Rect::new(x as f64 * 0.5, y as f64 * 0.5, w as f64, h as f64))
}

fn arb_spacings() -> impl Strategy<Value = (f64, f64)> {
    (
        prop_oneof![Just(1.0), Just(2.0)],
        prop_oneof![Just(0.25), Just(0.5), Just(1.0), Just(2.0)],
    )
}

fn arb_pan_steps() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec(
        (-4..=4i32, -4..=4i32).prop_map(|(dx, dy)| (dx as f64 * 0.5, dy as f64 * 0.5)),
        1..5,
    )
}

fn check_exact_cover(leaves: &[Square<bool>], domain: Rect, pixel: f64) {
    let nx = (domain.width / pixel).round() as usize;
    let ny = (domain.height / pixel).round() as usize;
    let mut painted = vec![0u32; nx * ny];
    for sq in leaves {
        let x0 = ((sq.x - sq.size / 2.0 - domain.x) / pixel).round() as usize;
        let y0 = ((sq.y - sq.size / 2.0 - domain.y) / pixel).round() as usize;
        let span = (sq.size / pixel).round() as usize;
        for j in 0..span {
            for i in 0..span {
                painted[(y0 + j) * nx + (x0 + i)] += 1;
            }
        }
    }
    assert!(
        painted.iter().all(|&c| c == 1),
        "leaves must tile the domain exactly once"
    );
}

fn check_balanced(leaves: &[Square<bool>]) {
    for a in leaves {
        for b in leaves {
            let touch_x = (a.x - b.x).abs() * 2.0 == a.size + b.size
                && (a.y - b.y).abs() * 2.0 < a.size + b.size;
            let touch_y = (a.y - b.y).abs() * 2.0 == a.size + b.size
                && (a.x - b.x).abs() * 2.0 < a.size + b.size;
            if touch_x || touch_y {
                let ratio = a.size / b.size;
                assert!(
                    ratio == 0.5 || ratio == 1.0 || ratio == 2.0,
                    "unbalanced neighbors: ({}, {}, {}) and ({}, {}, {})",
                    a.x,
                    a.y,
                    a.size,
                    b.x,
                    b.y,
                    b.size
                );
            }
        }
    }
}

fn check_rows_covered(runs: &[Run<bool>], domain: Rect, pixel: f64) {
    let rows = (domain.height / pixel).round() as usize;
    let mut idx = 0;
    for k in 0..rows {
        let y = domain.y + (k as f64 + 0.5) * pixel;
        let mut x = domain.x;
        while idx < runs.len() && runs[idx].y == y {
            assert_eq!(runs[idx].x0, x, "run must start where the last ended");
            assert!(runs[idx].x1 > runs[idx].x0);
            x = runs[idx].x1;
            idx += 1;
        }
        assert_eq!(x, domain.right(), "row at y={} must be fully covered", y);
    }
    assert_eq!(idx, runs.len(), "no runs outside the expected rows");
}

fn check_compression(compressed: &[Square<bool>], leaves: &[Square<bool>]) {
    for sq in compressed {
        for leaf in leaves {
            let inside = (leaf.x - sq.x).abs() * 2.0 <= sq.size - leaf.size
                && (leaf.y - sq.y).abs() * 2.0 <= sq.size - leaf.size;
            if inside {
                assert_eq!(leaf.value, sq.value, "compressed tile hides a dissenting leaf");
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn tiles_and_rows_cover_domain(
        plane in arb_half_plane(),
        domain in arb_domain(),
        (spacing, pixel) in arb_spacings(),
    ) {
        let mut plot = Plot::new(move |x, y| plane.eval(x, y));
        plot.compute(domain, spacing, pixel).unwrap();
        let aligned = plot.domain();
        let pixel = plot.pixel_size();

        let leaves = plot.leaves();
        check_exact_cover(&leaves, aligned, pixel);
        check_balanced(&leaves);
        for leaf in &leaves {
            prop_assert_eq!(leaf.value, plane.eval(leaf.x, leaf.y));
        }
        check_rows_covered(&plot.runs(), aligned, pixel);
        check_compression(&plot.squares(), &leaves);
    }

    #[test]
    fn identical_recompute_is_free(
        plane in arb_half_plane(),
        domain in arb_domain(),
        (spacing, pixel) in arb_spacings(),
    ) {
        let mut plot = Plot::new(move |x, y| plane.eval(x, y));
        plot.compute(domain, spacing, pixel).unwrap();
        let first_runs = plot.runs();

        plot.compute(domain, spacing, pixel).unwrap();
        prop_assert_eq!(plot.compute_stats().new_calls, 0);
        prop_assert_eq!(plot.compute_stats().new_area, 0.0);
        prop_assert_eq!(plot.runs(), first_runs);
    }

    #[test]
    fn contained_recompute_reports_no_new_area(
        plane in arb_half_plane(),
        domain in arb_domain(),
        (spacing, pixel) in arb_spacings(),
    ) {
        let outer = Rect::new(
            domain.x - 2.0 * spacing,
            domain.y - 2.0 * spacing,
            domain.width + 4.0 * spacing,
            domain.height + 4.0 * spacing,
        );
        let mut plot = Plot::new(move |x, y| plane.eval(x, y));
        plot.compute(outer, spacing, pixel).unwrap();
        plot.compute(domain, spacing, pixel).unwrap();
        prop_assert_eq!(plot.compute_stats().new_area, 0.0);

        let aligned = plot.domain();
        let pixel = plot.pixel_size();
        check_exact_cover(&plot.leaves(), aligned, pixel);
        check_rows_covered(&plot.runs(), aligned, pixel);
    }

    #[test]
    fn random_panning_keeps_runs_intact(
        plane in arb_half_plane(),
        domain in arb_domain(),
        (spacing, pixel) in arb_spacings(),
        steps in arb_pan_steps(),
    ) {
        let mut plot = Plot::new(move |x, y| plane.eval(x, y));
        plot.compute(domain, spacing, pixel).unwrap();
        let mut current = domain;
        for (dx, dy) in steps {
            current = Rect::new(current.x + dx, current.y + dy, current.width, current.height);
            plot.compute(current, spacing, pixel).unwrap();
            let aligned = plot.domain();
            let px = plot.pixel_size();

            let leaves = plot.leaves();
            check_exact_cover(&leaves, aligned, px);
            for leaf in &leaves {
                prop_assert_eq!(leaf.value, plane.eval(leaf.x, leaf.y));
            }
            check_rows_covered(&plot.runs(), aligned, px);
        }
    }
}
