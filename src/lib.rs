//! Parser for Biovision Hierarchy (.bvh) motion capture files.
//!
//! [`parse_bvh`] reads the skeleton and every frame into a [`Bvh`] node arena.
//! [`to_animation`] turns that into a flat bone list plus one position and one rotation
//! [`KeyframeTrack`] per animated bone, ready to be bound to an animation system by bone name.
//!
//! ```
//! use bvh_track_parser::{parse_bvh, to_animation};
//!
//! let source = "HIERARCHY
//! ROOT hip
//! {
//!   OFFSET 0 0 0
//!   CHANNELS 3 Xrotation Yrotation Zrotation
//!   End Site
//!   {
//!     OFFSET 0 0 0
//!   }
//! }
//! MOTION
//! Frames: 1
//! Frame Time: 0.0333333
//! 90 0 0";
//!
//! let bvh = parse_bvh(source).unwrap();
//! let animation = to_animation(&bvh);
//! assert_eq!(animation.bones.len(), 2);
//! assert_eq!(animation.clip.tracks.len(), 2);
//! ```

pub mod error;
pub mod parse;
pub mod quaternion;
pub mod tracks;
pub mod types;
mod utils;

pub use error::{BvhError, Result};
pub use parse::{parse_bvh, parse_bvh_with, parse_lines, ParseOptions};
pub use quaternion::Quaternion;
pub use tracks::{
    build_clip, build_skeleton, flatten, to_animation, AnimationClip, Bone, BvhAnimation,
    KeyframeTrack, Track,
};
pub use types::{Bvh, Channel, Keyframe, Node, NodeKind, Position};
