use crate::config::DriftCeilings;
use crate::constants::EXPRESSION_EASE;
use rand::Rng;

/// Two independent bounded random walks feeding the ambient "happy" and
/// "angry" expressions.
///
/// Invariant: `0 <= positive <= ceilings.positive` and
/// `0 <= negative <= ceilings.negative` after every call.
#[derive(Clone, Debug)]
pub struct ExpressionDrift {
    positive: f32,
    negative: f32,
    ceilings: DriftCeilings,
}

impl ExpressionDrift {
    pub fn new(ceilings: DriftCeilings) -> Self {
        Self {
            positive: 0.0,
            negative: 0.0,
            ceilings: sanitize(ceilings),
        }
    }

    pub fn positive(&self) -> f32 {
        self.positive
    }

    pub fn negative(&self) -> f32 {
        self.negative
    }

    pub fn ceilings(&self) -> DriftCeilings {
        self.ceilings
    }

    /// Replace the ceilings and pull current values back inside them.
    pub fn set_ceilings(&mut self, ceilings: DriftCeilings) {
        self.ceilings = sanitize(ceilings);
        self.positive = self.positive.clamp(0.0, self.ceilings.positive);
        self.negative = self.negative.clamp(0.0, self.ceilings.negative);
    }

    /// One tick: each channel moves by an independent step in [-0.005, 0.005).
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.positive = walk(self.positive, rng.gen::<f32>(), self.ceilings.positive);
        self.negative = walk(self.negative, rng.gen::<f32>(), self.ceilings.negative);
    }
}

#[inline]
fn walk(value: f32, unit: f32, ceiling: f32) -> f32 {
    (value + (unit - 0.5) / EXPRESSION_EASE).clamp(0.0, ceiling)
}

// A bias outside 0..=100 would yield a negative ceiling, which `clamp` rejects.
fn sanitize(c: DriftCeilings) -> DriftCeilings {
    DriftCeilings {
        positive: c.positive.max(0.0),
        negative: c.negative.max(0.0),
    }
}
