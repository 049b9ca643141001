use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Clockwise display rotation of a video in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rotation(pub i32);

impl Rotation {
    pub fn degrees(self) -> i32 {
        self.0
    }

    pub fn is_right_angle(self) -> bool {
        self.0 % 90 == 0
    }
}

impl From<i32> for Rotation {
    fn from(value: i32) -> Self {
        Rotation(value)
    }
}

impl Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// What to do with rotation values that are not multiples of 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum RotationPolicy {
    /// Report whatever the container says.
    #[default]
    PassThrough,
    /// Treat anything but 0/90/180/270 (and their multiples) as unavailable.
    RightAnglesOnly,
}

impl RotationPolicy {
    pub fn accepts(self, rotation: Rotation) -> bool {
        match self {
            RotationPolicy::PassThrough => true,
            RotationPolicy::RightAnglesOnly => rotation.is_right_angle(),
        }
    }
}

#[test]
fn rotation_policies() {
    let odd = Rotation(45);
    let negative = Rotation(-90);
    assert!(RotationPolicy::PassThrough.accepts(odd));
    assert!(RotationPolicy::PassThrough.accepts(negative));
    assert!(!RotationPolicy::RightAnglesOnly.accepts(odd));
    assert!(RotationPolicy::RightAnglesOnly.accepts(negative));
    assert!(RotationPolicy::RightAnglesOnly.accepts(Rotation(270)));
}
