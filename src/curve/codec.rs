//! Fixed 11-channel pose layout.
//!
//! A pose sample maps onto eleven indexed float channels:
//!
//! | index | channel           |
//! |-------|-------------------|
//! | 0-2   | position x, y, z  |
//! | 3-6   | rotation x, y, z, w |
//! | 7-9   | scale x, y, z     |
//! | 10    | activity (enabled as 0/1) |
//!
//! Position, rotation and scale channels bind to the node's transform
//! behavior; the activity channel binds to the node itself.

use crate::util::{Chrono, Quat, Vec3};

use super::binding::Binding;

/// Number of channels in the pose layout.
pub const CHANNEL_COUNT: usize = 11;

/// Type name of the transform behavior that pose channels bind to.
pub const TRANSFORM_BEHAVIOR: &str = "Transform";

/// Property name of the activity channel.
pub const ACTIVITY_PROPERTY: &str = "active";

/// Fixed channel name table, indexed by channel.
const CHANNEL_PROPERTIES: [&str; CHANNEL_COUNT] = [
    "localPosition.x",
    "localPosition.y",
    "localPosition.z",
    "localRotation.x",
    "localRotation.y",
    "localRotation.z",
    "localRotation.w",
    "localScale.x",
    "localScale.y",
    "localScale.z",
    ACTIVITY_PROPERTY,
];

/// One recorded pose of a node at a point in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseSample {
    /// Time in seconds since recording start.
    pub time: Chrono,
    /// Whether the node was enabled.
    pub enabled: bool,
    /// Local position.
    pub position: Vec3,
    /// Local rotation (unit quaternion).
    pub rotation: Quat,
    /// Local scale.
    pub scale: Vec3,
}

impl PoseSample {
    /// Identity pose at the given time: enabled, no translation or rotation,
    /// unit scale.
    pub fn identity(time: Chrono) -> Self {
        Self {
            time,
            enabled: true,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Logical grouping of channels sharing one constancy decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelGroup {
    Position,
    Rotation,
    Scale,
    Activity,
}

impl ChannelGroup {
    /// All four pose channel groups, in channel-index order.
    pub const ALL: [ChannelGroup; 4] = [
        ChannelGroup::Position,
        ChannelGroup::Rotation,
        ChannelGroup::Scale,
        ChannelGroup::Activity,
    ];

    /// Channel index range covered by this group.
    pub fn channels(self) -> std::ops::Range<usize> {
        match self {
            Self::Position => 0..3,
            Self::Rotation => 3..7,
            Self::Scale => 7..10,
            Self::Activity => 10..11,
        }
    }

    /// Group that a channel index belongs to.
    pub fn of_channel(index: usize) -> Self {
        assert!(index < CHANNEL_COUNT, "channel index out of range: {index}");
        match index {
            0..=2 => Self::Position,
            3..=6 => Self::Rotation,
            7..=9 => Self::Scale,
            _ => Self::Activity,
        }
    }
}

/// Property name of a channel index.
pub fn channel_property(index: usize) -> &'static str {
    assert!(index < CHANNEL_COUNT, "channel index out of range: {index}");
    CHANNEL_PROPERTIES[index]
}

/// Binding for a channel of the node at `path`.
///
/// Transform channels target the node's transform behavior; the activity
/// channel targets the node itself.
pub fn channel_binding(path: &str, index: usize) -> Binding {
    let property = channel_property(index);
    if ChannelGroup::of_channel(index) == ChannelGroup::Activity {
        Binding::node(path, property)
    } else {
        Binding::behavior(path, TRANSFORM_BEHAVIOR, property)
    }
}

/// Read the value of one channel from a pose sample.
pub fn decode(sample: &PoseSample, index: usize) -> f32 {
    match index {
        0 => sample.position.x,
        1 => sample.position.y,
        2 => sample.position.z,
        3 => sample.rotation.x,
        4 => sample.rotation.y,
        5 => sample.rotation.z,
        6 => sample.rotation.w,
        7 => sample.scale.x,
        8 => sample.scale.y,
        9 => sample.scale.z,
        10 => {
            if sample.enabled {
                1.0
            } else {
                0.0
            }
        }
        _ => panic!("channel index out of range: {index}"),
    }
}

/// Write the value of one channel into a pose sample.
pub fn encode(sample: &mut PoseSample, index: usize, value: f32) {
    match index {
        0 => sample.position.x = value,
        1 => sample.position.y = value,
        2 => sample.position.z = value,
        3..=6 => {
            let mut q = [
                sample.rotation.x,
                sample.rotation.y,
                sample.rotation.z,
                sample.rotation.w,
            ];
            q[index - 3] = value;
            sample.rotation = Quat::from_xyzw(q[0], q[1], q[2], q[3]);
        }
        7 => sample.scale.x = value,
        8 => sample.scale.y = value,
        9 => sample.scale.z = value,
        10 => sample.enabled = value != 0.0,
        _ => panic!("channel index out of range: {index}"),
    }
}
