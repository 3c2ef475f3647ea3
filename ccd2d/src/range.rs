use crate::{Error, normalize_degrees};
use rand::Rng;

/// The set of legal orientations of a joint.
///
/// A range is either the full circle, a single interval `[start, end]` or, when the legal
/// range wraps past 360°, the union `[start, 360) ∪ [0, end]`. Bounds are stored normalized
/// into `[0, 360)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MovementRange {
    span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Span {
    Full,
    Single { start: f32, end: f32 },
    Wrapping { start: f32, end: f32 },
}

impl Default for MovementRange {
    fn default() -> Self {
        Self::full()
    }
}

impl MovementRange {
    /// The unconstrained range, equivalent to `MovementRange::new(0.0, 360.0)`.
    pub fn full() -> Self {
        Self { span: Span::Full }
    }

    /// Creates the range that starts at `start` and runs counter-clockwise to `end`.
    ///
    /// `new(270.0, 90.0)` is the 180° wedge through 0°; `new(0.0, 360.0)` is the full circle.
    pub fn new(start: f32, end: f32) -> Result<Self, Error> {
        if !start.is_finite() || !end.is_finite() {
            return Err(Error::InvalidValue {
                message: format!("movement range bounds must be finite, got [{start}, {end}]"),
            });
        }
        if end - start >= 360.0 {
            return Ok(Self::full());
        }

        let start = normalize_degrees(start);
        let end = normalize_degrees(end);
        let span = if start <= end {
            Span::Single { start, end }
        } else {
            Span::Wrapping { start, end }
        };
        Ok(Self { span })
    }

    pub fn is_full(&self) -> bool {
        matches!(self.span, Span::Full)
    }

    /// Lower bound, i.e. the boundary reached when rotating clockwise.
    pub fn start(&self) -> f32 {
        match self.span {
            Span::Full => 0.0,
            Span::Single { start, .. } | Span::Wrapping { start, .. } => start,
        }
    }

    /// Upper bound, i.e. the boundary reached when rotating counter-clockwise.
    pub fn end(&self) -> f32 {
        match self.span {
            Span::Full => 360.0,
            Span::Single { end, .. } | Span::Wrapping { end, .. } => end,
        }
    }

    pub fn is_in_range(&self, degrees: f32) -> bool {
        let angle = normalize_degrees(degrees);
        match self.span {
            Span::Full => true,
            Span::Single { start, end } => start <= angle && angle <= end,
            Span::Wrapping { start, end } => angle >= start || angle <= end,
        }
    }

    /// Returns `degrees` normalized when it is legal, otherwise the interval endpoint closest to
    /// it. Ties go to the endpoint scanned first (`start` before `end`).
    pub fn clamp(&self, degrees: f32) -> f32 {
        let angle = normalize_degrees(degrees);
        if self.is_in_range(angle) {
            return angle;
        }

        let start = self.start();
        let end = self.end();
        if (angle - end).abs() < (angle - start).abs() {
            end
        } else {
            start
        }
    }

    /// The boundary a clockwise (decreasing angle) rotation runs into.
    pub fn max_valid_angle_cw(&self) -> f32 {
        self.start()
    }

    /// The boundary a counter-clockwise (increasing angle) rotation runs into.
    pub fn max_valid_angle_ccw(&self) -> f32 {
        normalize_degrees(self.end())
    }

    /// Draws a legal orientation: an interval is picked uniformly, then a value uniformly within it.
    pub fn random_value<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match self.span {
            Span::Full => normalize_degrees(rng.gen_range(0.0..360.0)),
            Span::Single { start, end } => {
                if start == end {
                    start
                } else {
                    rng.gen_range(start..=end)
                }
            }
            Span::Wrapping { start, end } => {
                if rng.gen_bool(0.5) {
                    normalize_degrees(rng.gen_range(start..360.0))
                } else if end == 0.0 {
                    0.0
                } else {
                    rng.gen_range(0.0..=end)
                }
            }
        }
    }
}
