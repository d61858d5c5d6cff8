const LUT_SIZE: usize = 32;
const SAMPLE_STEP: f32 = 1.0 / (LUT_SIZE as f32 - 1.0);
const NEWTON_ITERATIONS: usize = 4;
const NEWTON_MIN_SLOPE: f32 = 0.02;
const SUBDIVISION_PRECISION: f32 = 1e-7;
const SUBDIVISION_MAX_ITERATIONS: usize = 10;

/// Unit cubic-bezier easing curve through (0,0) and (1,1) with two authored
/// control points, as exported per keyframe by the authoring tool.
///
/// Evaluation solves x(t) = input for t with a sampled lookup table as the
/// initial guess, Newton-Raphson where the slope allows, and bisection
/// otherwise, then returns y(t).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicEase {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    samples: [f32; LUT_SIZE],
}

impl CubicEase {
    /// Build a curve from the two control points `(x1, y1)` and `(x2, y2)`.
    /// X coordinates are clamped to `[0, 1]` so x(t) stays invertible.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let x1 = x1.clamp(0.0, 1.0);
        let x2 = x2.clamp(0.0, 1.0);
        let mut ease = Self {
            x1,
            y1,
            x2,
            y2,
            samples: [0.0; LUT_SIZE],
        };
        for (i, slot) in ease.samples.iter_mut().enumerate() {
            *slot = calc_bezier(i as f32 * SAMPLE_STEP, x1, x2);
        }
        ease
    }

    /// Evaluate the curve at `x` clamped to `[0, 1]`.
    pub fn apply(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        // A curve with both control points on the diagonal is linear.
        if (self.x1 - self.y1).abs() < f32::EPSILON && (self.x2 - self.y2).abs() < f32::EPSILON {
            return x;
        }
        if x == 0.0 || x == 1.0 {
            return x;
        }
        calc_bezier(self.t_for_x(x), self.y1, self.y2)
    }

    fn t_for_x(&self, x: f32) -> f32 {
        let mut interval_start = 0.0;
        let mut sample = 1;
        while sample < LUT_SIZE - 1 && self.samples[sample] <= x {
            sample += 1;
            interval_start += SAMPLE_STEP;
        }
        sample -= 1;

        let span = self.samples[sample + 1] - self.samples[sample];
        let dist = if span > 0.0 {
            (x - self.samples[sample]) / span
        } else {
            0.0
        };
        let mut guess = interval_start + dist * SAMPLE_STEP;

        let initial_slope = slope(guess, self.x1, self.x2);
        if initial_slope >= NEWTON_MIN_SLOPE {
            for _ in 0..NEWTON_ITERATIONS {
                let current_slope = slope(guess, self.x1, self.x2);
                if current_slope == 0.0 {
                    return guess;
                }
                let err = calc_bezier(guess, self.x1, self.x2) - x;
                guess -= err / current_slope;
            }
            guess
        } else if initial_slope == 0.0 {
            guess
        } else {
            self.bisect(x, interval_start, interval_start + SAMPLE_STEP)
        }
    }

    fn bisect(&self, x: f32, mut lo: f32, mut hi: f32) -> f32 {
        let mut t = lo;
        for _ in 0..SUBDIVISION_MAX_ITERATIONS {
            t = lo + (hi - lo) / 2.0;
            let err = calc_bezier(t, self.x1, self.x2) - x;
            if err.abs() <= SUBDIVISION_PRECISION {
                break;
            }
            if err > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
        }
        t
    }
}

fn coeff_a(a1: f32, a2: f32) -> f32 {
    1.0 - 3.0 * a2 + 3.0 * a1
}

fn coeff_b(a1: f32, a2: f32) -> f32 {
    3.0 * a2 - 6.0 * a1
}

fn coeff_c(a1: f32) -> f32 {
    3.0 * a1
}

fn calc_bezier(t: f32, a1: f32, a2: f32) -> f32 {
    ((coeff_a(a1, a2) * t + coeff_b(a1, a2)) * t + coeff_c(a1)) * t
}

fn slope(t: f32, a1: f32, a2: f32) -> f32 {
    3.0 * coeff_a(a1, a2) * t * t + 2.0 * coeff_b(a1, a2) * t + coeff_c(a1)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/bezier.rs"]
mod tests;
