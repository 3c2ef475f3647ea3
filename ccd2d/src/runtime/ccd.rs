use crate::{
    CompletionCallback, ConstraintValidator, Error, KinematicsChain, NoConstraints, Outcome,
    Solver,
};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Tuning knobs of [`CcdSolver`].
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// The end effector has arrived once it is at most this far from the target.
    pub arrival_distance: f32,
    /// A sweep that moves the end effector less than this counts as a failed sweep.
    pub min_change: f32,
    /// Rotation steps are skipped when `|pivot→end| * |pivot→target|` is at most this.
    pub epsilon: f32,
    /// Sweeps allowed per starting pose before a random restart.
    pub max_iterations: usize,
    /// Consecutive failed sweeps tolerated before a random restart.
    pub failure_retries: usize,
    /// Random restarts before giving up.
    pub random_restarts: usize,
    /// Seed for restart poses; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            arrival_distance: 0.05,
            min_change: 0.01,
            epsilon: 1.0e-4,
            max_iterations: 200,
            failure_retries: 100,
            random_restarts: 200,
            seed: None,
        }
    }
}

impl SolverConfig {
    fn check(&self) -> Result<(), Error> {
        for (what, value) in [
            ("arrival distance", self.arrival_distance),
            ("min change", self.min_change),
            ("epsilon", self.epsilon),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidValue {
                    message: format!("solver {what} must be finite and >= 0, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Cyclic coordinate descent solver over a private chain.
///
/// Work is resumable: the iteration, failure-retry and random-restart counters live in the
/// solver, so a solve can be spread across many bounded [`Solver::solve`] calls.
pub struct CcdSolver {
    chain: KinematicsChain,
    end_bone: usize,
    target: Vec2,
    config: SolverConfig,
    validator: Box<dyn ConstraintValidator>,
    completion: Option<Box<dyn CompletionCallback>>,
    completion_fired: bool,
    rng: ChaCha8Rng,

    final_outcome: Option<Outcome>,
    iterations_left: usize,
    failure_retries_left: usize,
    random_restarts_left: usize,
}

impl CcdSolver {
    /// Takes ownership of `chain`; pass a copy when the caller's chain must stay untouched.
    pub fn new(chain: KinematicsChain, target: Vec2, config: SolverConfig) -> Result<Self, Error> {
        chain.validate()?;
        config.check()?;
        if !target.is_finite() {
            return Err(Error::InvalidValue {
                message: format!("target must be finite, got {target}"),
            });
        }

        let end_bone = chain.end_bone()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut chain = chain;
        chain.apply_forward_kinematics();

        Ok(Self {
            chain,
            end_bone,
            target,
            iterations_left: config.max_iterations,
            failure_retries_left: config.failure_retries,
            random_restarts_left: config.random_restarts,
            config,
            validator: Box::new(NoConstraints),
            completion: None,
            completion_fired: false,
            rng,
            final_outcome: None,
        })
    }

    pub fn with_validator(mut self, validator: impl ConstraintValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_completion(mut self, callback: impl CompletionCallback + 'static) -> Self {
        self.completion = Some(Box::new(callback));
        self
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Consumes the solver, returning its chain.
    pub fn into_chain(self) -> KinematicsChain {
        self.chain
    }

    fn finish(&mut self, outcome: Outcome) -> Outcome {
        self.final_outcome = Some(outcome);
        log::debug!(
            "CCD solve towards {} finished: {:?} ({} random restarts left)",
            self.target,
            outcome,
            self.random_restarts_left
        );
        if let Some(mut callback) = self.completion.take() {
            assert!(
                !self.completion_fired,
                "completion callback invoked twice for the same solve"
            );
            self.completion_fired = true;
            callback.on_complete(&*self, outcome);
        }
        outcome
    }

    /// Starts over from a random pose, or finishes with [`Outcome::Failure`] when no restarts are
    /// left.
    fn restart_or_fail(&mut self) -> Outcome {
        if self.random_restarts_left == 0 {
            return self.finish(Outcome::Failure);
        }
        self.random_restarts_left -= 1;
        self.chain.set_random_orientations(&mut self.rng);
        self.chain.apply_forward_kinematics();
        self.iterations_left = self.config.max_iterations;
        self.failure_retries_left = self.config.failure_retries;
        log::debug!(
            "CCD restarting from a random pose ({} restarts left)",
            self.random_restarts_left
        );
        Outcome::Processing
    }

    fn has_arrived(&self) -> bool {
        let end = self.chain.bones()[self.end_bone].positioning_end();
        end.distance_squared(self.target) <= self.config.arrival_distance.powi(2)
    }

    fn arrival_outcome(&self) -> Outcome {
        if self.validator.is_invalid_configuration(&self.chain) {
            Outcome::Failure
        } else {
            Outcome::Success
        }
    }

    /// One sweep from the joint nearest the end effector back to the root.
    fn single_iteration(&mut self) -> Outcome {
        let target = self.target;
        let end_bone = self.end_bone;
        let initial_distance = self.chain.bones()[end_bone]
            .positioning_end()
            .distance(target);

        let mut current = Some(self.chain.bones()[end_bone].joint_a());
        while let Some(joint_index) = current {
            let joint = &self.chain.joints()[joint_index];
            let Some(successor) = joint.successor() else {
                break;
            };
            let pivot = joint.position();
            let end = self.chain.bones()[end_bone].positioning_end();

            let to_end = end - pivot;
            let to_target = target - pivot;
            let magnitude = to_end.length() * to_target.length();
            let (cos, sin): (f32, f32) = if magnitude <= self.config.epsilon {
                (1.0, 0.0)
            } else {
                (
                    to_end.dot(to_target) / magnitude,
                    to_end.perp_dot(to_target) / magnitude,
                )
            };

            let mut radians = cos.clamp(-1.0, 1.0).acos();
            if sin < 0.0 {
                radians = -radians;
            }
            let degrees = radians.to_degrees();
            log::trace!(
                "adjusting joint '{}' by {degrees} degrees",
                self.chain.joints()[joint_index].name()
            );

            if let Some(joint) = self.chain.joint_mut(joint_index) {
                joint.add_orientation(degrees);
            }
            self.chain.forward_kinematics_from(successor);

            if self.has_arrived() {
                return self.arrival_outcome();
            }

            current = self.chain.joints()[joint_index]
                .predecessor()
                .map(|bone| self.chain.bones()[bone].joint_a());
        }

        if self.has_arrived() {
            return self.arrival_outcome();
        }
        let distance = self.chain.bones()[end_bone]
            .positioning_end()
            .distance(target);
        if (distance - initial_distance).abs() >= self.config.min_change {
            Outcome::Processing
        } else {
            Outcome::Failure
        }
    }
}

impl Solver for CcdSolver {
    fn solve(&mut self, max_iterations: usize) -> Outcome {
        if let Some(outcome) = self.final_outcome {
            return outcome;
        }

        let mut outcome = Outcome::Processing;
        for _ in 0..max_iterations {
            outcome = self.single_iteration();
            let budget_exhausted = self.iterations_left == 0;
            self.iterations_left = self.iterations_left.saturating_sub(1);

            match outcome {
                Outcome::Success => return self.finish(Outcome::Success),
                Outcome::Failure => {
                    if self.failure_retries_left > 0 {
                        self.failure_retries_left -= 1;
                        outcome = Outcome::Processing;
                    } else {
                        outcome = self.restart_or_fail();
                    }
                }
                Outcome::Processing => {
                    if budget_exhausted {
                        outcome = self.restart_or_fail();
                    } else {
                        self.failure_retries_left = self.config.failure_retries;
                    }
                }
            }
            if let Some(outcome) = self.final_outcome {
                return outcome;
            }
        }
        outcome
    }

    fn has_finished(&self) -> bool {
        self.final_outcome.is_some()
    }

    fn chain(&self) -> &KinematicsChain {
        &self.chain
    }
}
