use crate::NodeKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} name must not be empty")]
    EmptyName { kind: NodeKind },

    #[error("duplicate {kind} '{name}'")]
    DuplicateName { kind: NodeKind, name: String },

    #[error("unknown joint: {name}")]
    UnknownJoint { name: String },

    #[error("unknown bone: {name}")]
    UnknownBone { name: String },

    #[error("invalid joint index: {index}")]
    InvalidJointIndex { index: usize },

    #[error("invalid bone index: {index}")]
    InvalidBoneIndex { index: usize },

    #[error("joint '{joint}' already has a successor bone")]
    SuccessorAlreadySet { joint: String },

    #[error("joint '{joint}' already has a predecessor bone")]
    PredecessorAlreadySet { joint: String },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error("chain has no root joint")]
    MissingRoot,

    #[error("chain has {count} root joints, expected exactly one")]
    MultipleRoots { count: usize },

    #[error("chain has no terminal bone")]
    MissingEndBone,

    #[error("chain has {count} terminal bones, expected exactly one")]
    MultipleEndBones { count: usize },

    #[error("chain is not a single open path: {message}")]
    MalformedChain { message: String },

    #[error("solver queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("solver worker is unavailable: {message}")]
    WorkerUnavailable { message: String },

    #[cfg(feature = "json")]
    #[error("failed to parse JSON: {message}")]
    JsonParse { message: String },
}
