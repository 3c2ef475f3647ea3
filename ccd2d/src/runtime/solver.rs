use crate::KinematicsChain;

/// Result of a (possibly partial) solve.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Outcome {
    /// Not done yet; call `solve` again.
    Processing,
    Success,
    Failure,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Processing)
    }
}

/// A resumable IK solver.
///
/// `solve` performs a bounded amount of work. Once it has returned a terminal outcome, every
/// further call returns that same outcome without doing any work.
pub trait Solver: Send {
    fn solve(&mut self, max_iterations: usize) -> Outcome;

    fn has_finished(&self) -> bool;

    /// The chain being solved; holds the solution after [`Outcome::Success`].
    fn chain(&self) -> &KinematicsChain;
}

/// Vetoes geometrically reached but otherwise illegal configurations.
///
/// Only consulted when the end effector has arrived at the target. Must not rely on side effects.
pub trait ConstraintValidator: Send {
    fn is_invalid_configuration(&self, chain: &KinematicsChain) -> bool;
}

impl<F> ConstraintValidator for F
where
    F: Fn(&KinematicsChain) -> bool + Send,
{
    fn is_invalid_configuration(&self, chain: &KinematicsChain) -> bool {
        self(chain)
    }
}

/// Accepts every configuration.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoConstraints;

impl ConstraintValidator for NoConstraints {
    fn is_invalid_configuration(&self, _chain: &KinematicsChain) -> bool {
        false
    }
}

/// Push notification for callers that prefer it over polling. Invoked at most once per solve.
pub trait CompletionCallback: Send {
    fn on_complete(&mut self, solver: &dyn Solver, outcome: Outcome);
}

impl<F> CompletionCallback for F
where
    F: FnMut(&dyn Solver, Outcome) + Send,
{
    fn on_complete(&mut self, solver: &dyn Solver, outcome: Outcome) {
        self(solver, outcome)
    }
}
