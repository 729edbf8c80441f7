use cgmath::Vector3;
use std::fmt;
use std::str::FromStr;

pub use crate::quaternion::Quaternion;

/////////////////////////////////////////////////////////////////////////////////////////////////

pub type Index = usize;
pub type Position = Vector3<f64>;
pub type Depth = usize;

/// Name given to every end site; the format does not name them, so it is not unique.
pub const END_SITE_NAME: &str = "ENDSITE";

/////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Root,
    Joint,
    EndSite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Position {
        match self {
            Axis::X => Position::unit_x(),
            Axis::Y => Position::unit_y(),
            Axis::Z => Position::unit_z(),
        }
    }
}

/// One animatable scalar declared on a joint's CHANNELS line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    Xposition,
    Yposition,
    Zposition,
    Xrotation,
    Yrotation,
    Zrotation,
}

impl Channel {
    pub fn axis(self) -> Axis {
        match self {
            Channel::Xposition | Channel::Xrotation => Axis::X,
            Channel::Yposition | Channel::Yrotation => Axis::Y,
            Channel::Zposition | Channel::Zrotation => Axis::Z,
        }
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, Channel::Xrotation | Channel::Yrotation | Channel::Zrotation)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Xposition => "Xposition",
            Channel::Yposition => "Yposition",
            Channel::Zposition => "Zposition",
            Channel::Xrotation => "Xrotation",
            Channel::Yrotation => "Yrotation",
            Channel::Zrotation => "Zrotation",
        }
    }
}

impl FromStr for Channel {
    type Err = ();

    /// Channel names are matched verbatim (case-sensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Xposition" => Ok(Channel::Xposition),
            "Yposition" => Ok(Channel::Yposition),
            "Zposition" => Ok(Channel::Zposition),
            "Xrotation" => Ok(Channel::Xrotation),
            "Yrotation" => Ok(Channel::Yrotation),
            "Zrotation" => Ok(Channel::Zrotation),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// A single frame's sample of one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub time: f64,
    /// Values of the position channels; axes without a channel stay at zero.
    pub local_position: Position,
    /// Rotation channels composed left to right in declaration order.
    pub rotation: Quaternion,
}

impl Keyframe {
    pub fn new(time: f64) -> Self {
        Keyframe {
            time,
            local_position: Position::new(0.0, 0.0, 0.0),
            rotation: Quaternion::IDENTITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    /// Position in discovery (preorder) order.
    pub index: Index,
    pub parent_index: Option<Index>,
    pub depth: Depth,
    pub offset: Position,
    pub channels: Vec<Channel>,
    pub children: Vec<Index>,
    pub frames: Vec<Keyframe>,
}

impl Node {
    pub fn is_end_site(&self) -> bool {
        self.kind == NodeKind::EndSite
    }
}

/// A parsed .bvh document.
///
/// `nodes` is an arena filled while the hierarchy is walked, so its order is the preorder of the tree
/// and the order in which every frame line is consumed. A parsed document always has its root at index 0.
#[derive(Debug, Clone)]
pub struct Bvh {
    pub nodes: Vec<Node>,
    pub num_frames: usize,
    pub frame_time: f64,
    pub fps: u32,
}

impl Bvh {
    /// `None` only for a hand-built, empty arena; parsing always yields a root.
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn node(&self, index: Index) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn children(&self, index: Index) -> impl Iterator<Item = &Node> + '_ {
        self.nodes
            .get(index)
            .into_iter()
            .flat_map(move |node| node.children.iter().map(move |&child| &self.nodes[child]))
    }

    /// First node with the given name in preorder. Duplicate names are not disambiguated.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Number of values expected on every frame line.
    pub fn num_channels(&self) -> usize {
        self.nodes.iter().map(|node| node.channels.len()).sum()
    }

    /// Timestamp of the last frame.
    pub fn duration(&self) -> f64 {
        self.num_frames.saturating_sub(1) as f64 * self.frame_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names_are_case_sensitive() {
        assert_eq!("Zrotation".parse::<Channel>(), Ok(Channel::Zrotation));
        assert!("zrotation".parse::<Channel>().is_err());
        assert!("Wrotation".parse::<Channel>().is_err());
    }

    #[test]
    fn test_channel_axis_and_kind() {
        assert_eq!(Channel::Yposition.axis(), Axis::Y);
        assert!(!Channel::Yposition.is_rotation());
        assert!(Channel::Xrotation.is_rotation());
        assert_eq!(Channel::Xrotation.axis().unit(), Position::new(1.0, 0.0, 0.0));
        assert_eq!(Channel::Zposition.to_string(), "Zposition");
    }

    #[test]
    fn test_empty_arena_has_no_root() {
        let bvh = Bvh {
            nodes: Vec::new(),
            num_frames: 0,
            frame_time: 0.0,
            fps: 0,
        };
        assert!(bvh.root().is_none());
        assert_eq!(bvh.num_channels(), 0);
    }

    #[test]
    fn test_new_keyframe_is_neutral() {
        let keyframe = Keyframe::new(0.5);
        assert_eq!(keyframe.time, 0.5);
        assert_eq!(keyframe.local_position, Position::new(0.0, 0.0, 0.0));
        assert_eq!(keyframe.rotation, Quaternion::IDENTITY);
    }
}
