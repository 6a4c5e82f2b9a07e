use crate::types::SkeletonId;
use std::{error, fmt};

/// Unified error type
///
/// Most variants are contract violations between animation data and
/// playback: a sampler stepped without a clip, a clip pointing at a skeleton
/// the provider doesn't know, or asset data that doesn't line up. These are
/// returned from the call that hit them and are not expected to be retried.
///
/// Some foreign error types are large so are boxed.
#[derive(Debug)]
pub enum RcError {
    NoClip,
    NoSkeleton(SkeletonId),
    NegativeTimeOrigin(f32),
    EmptyClip,
    UnsortedPoses(usize),
    PoseCountMismatch { expected: usize, found: usize },
    JointCountMismatch { expected: usize, found: usize },
    TooManyJoints(usize),
    BadParent { joint: usize, parent: u8 },
    UnknownClip(String),
    NoNode(usize),
    StdIoError(std::io::Error),
    SerdeYamlError(Box<serde_yaml::Error>),
}

impl error::Error for RcError {}

impl fmt::Display for RcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoClip => write!(f, "no clip assigned to sampler"),
            Self::NoSkeleton(id) => {
                write!(f, "skeleton {} could not be resolved", id.0)
            }
            Self::NegativeTimeOrigin(tau) => {
                write!(f, "time origin {tau} is negative, was play called?")
            }
            Self::EmptyClip => write!(f, "clip must contain at least one pose"),
            Self::UnsortedPoses(a) => {
                write!(f, "pose {a} has a timestamp before the previous pose")
            }
            Self::PoseCountMismatch { expected, found } => {
                write!(
                    f,
                    "pose has {found} joint poses but {expected} were expected"
                )
            }
            Self::JointCountMismatch { expected, found } => {
                write!(
                    f,
                    "clip has {found} joint poses per key but skeleton needs \
                     {expected}"
                )
            }
            Self::TooManyJoints(a) => {
                write!(f, "{a} joints do not fit in the palette")
            }
            Self::BadParent { joint, parent } => {
                write!(
                    f,
                    "joint {joint} has parent {parent} which is not before it"
                )
            }
            Self::UnknownClip(name) => write!(f, "no clip named {name:?}"),
            Self::NoNode(a) => write!(f, "node {a} is not in the scene"),
            Self::StdIoError(e) => write!(f, "std::io::Error: {}", e.kind()),
            Self::SerdeYamlError(e) => {
                write!(f, "serde_yaml::Error: {e}")
            }
        }
    }
}

impl From<serde_yaml::Error> for RcError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::SerdeYamlError(Box::new(e))
    }
}

impl From<std::io::Error> for RcError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}
