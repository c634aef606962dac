//! Curve data model: bindings, keyframes, the pose channel codec, and the
//! lossless reduction contract.

pub mod binding;
pub mod codec;
pub mod keyframe;
pub mod reduce;

pub use binding::{Binding, GroupKey, TargetKind};
pub use codec::{ChannelGroup, PoseSample, ACTIVITY_PROPERTY, CHANNEL_COUNT, TRANSFORM_BEHAVIOR};
pub use keyframe::{Curve, Keyframe};
pub use reduce::{CurveReducer, LinearReducer};
