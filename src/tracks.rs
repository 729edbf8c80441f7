use crate::types::*;
use log::debug;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// A skeleton joint as handed to an animation system: parent link plus bind pose local offset.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bone {
    pub name: String,
    pub kind: NodeKind,
    pub index: Index,
    pub parent: Option<Index>,
    pub children: Vec<Index>,
    pub depth: Depth,
    pub offset: Position,
}

/// Samples of one animated property of one bone.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyframeTrack<T> {
    /// Binding path, e.g. `.bones[Hips].position`.
    pub name: String,
    pub bone: String,
    pub bone_index: Index,
    pub times: Vec<f64>,
    pub values: Vec<T>,
}

impl<T> KeyframeTrack<T> {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn end_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }
}

impl KeyframeTrack<Position> {
    /// Values laid out as `x, y, z` per sample.
    pub fn flat_values(&self) -> Vec<f64> {
        self.values.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }
}

impl KeyframeTrack<Quaternion> {
    /// Values laid out as `x, y, z, w` per sample.
    pub fn flat_values(&self) -> Vec<f64> {
        self.values.iter().flat_map(|q| q.to_array()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Track {
    Position(KeyframeTrack<Position>),
    Rotation(KeyframeTrack<Quaternion>),
}

impl Track {
    pub fn name(&self) -> &str {
        match self {
            Track::Position(track) => &track.name,
            Track::Rotation(track) => &track.name,
        }
    }

    pub fn bone(&self) -> &str {
        match self {
            Track::Position(track) => &track.bone,
            Track::Rotation(track) => &track.bone,
        }
    }

    pub fn end_time(&self) -> f64 {
        match self {
            Track::Position(track) => track.end_time(),
            Track::Rotation(track) => track.end_time(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationClip {
    pub name: String,
    pub duration: f64,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    pub fn position_tracks(&self) -> impl Iterator<Item = &KeyframeTrack<Position>> {
        self.tracks.iter().filter_map(|track| match track {
            Track::Position(track) => Some(track),
            Track::Rotation(_) => None,
        })
    }

    pub fn rotation_tracks(&self) -> impl Iterator<Item = &KeyframeTrack<Quaternion>> {
        self.tracks.iter().filter_map(|track| match track {
            Track::Rotation(track) => Some(track),
            Track::Position(_) => None,
        })
    }
}

/// Skeleton and clip ready for an animation system to bind by bone name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BvhAnimation {
    pub bones: Vec<Bone>,
    pub clip: AnimationClip,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Walks the tree from the root and returns node indices in preorder. End sites are included.
pub fn flatten(bvh: &Bvh) -> Vec<Index> {
    fn visit(bvh: &Bvh, index: Index, out: &mut Vec<Index>) {
        out.push(index);
        for &child in &bvh.nodes[index].children {
            visit(bvh, child, out);
        }
    }

    let mut out = Vec::with_capacity(bvh.nodes.len());
    if !bvh.nodes.is_empty() {
        visit(bvh, 0, &mut out);
    }
    out
}

pub fn build_skeleton(bvh: &Bvh) -> Vec<Bone> {
    flatten(bvh)
        .into_iter()
        .map(|index| {
            let node = &bvh.nodes[index];
            Bone {
                name: node.name.clone(),
                kind: node.kind,
                index,
                parent: node.parent_index,
                children: node.children.clone(),
                depth: node.depth,
                offset: node.offset,
            }
        })
        .collect()
}

/// One position and one rotation track per animated bone.
///
/// Position samples are the channel values plus the bone's static offset. Bone names are used as-is,
/// so two bones sharing a name produce tracks with the same binding path.
pub fn build_clip(bvh: &Bvh) -> AnimationClip {
    let mut tracks = Vec::new();

    for index in flatten(bvh) {
        let node = &bvh.nodes[index];
        if node.is_end_site() {
            continue;
        }

        let times: Vec<f64> = node.frames.iter().map(|frame| frame.time).collect();
        let positions = node
            .frames
            .iter()
            .map(|frame| frame.local_position + node.offset)
            .collect();
        let rotations = node.frames.iter().map(|frame| frame.rotation).collect();

        tracks.push(Track::Position(KeyframeTrack {
            name: format!(".bones[{}].position", node.name),
            bone: node.name.clone(),
            bone_index: index,
            times: times.clone(),
            values: positions,
        }));
        tracks.push(Track::Rotation(KeyframeTrack {
            name: format!(".bones[{}].quaternion", node.name),
            bone: node.name.clone(),
            bone_index: index,
            times,
            values: rotations,
        }));
    }

    let duration = tracks.iter().map(Track::end_time).fold(0.0, f64::max);
    debug!("Built clip with {} tracks, duration {}", tracks.len(), duration);

    AnimationClip {
        name: "animation".to_string(),
        duration,
        tracks,
    }
}

pub fn to_animation(bvh: &Bvh) -> BvhAnimation {
    BvhAnimation {
        bones: build_skeleton(bvh),
        clip: build_clip(bvh),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(name: &str, kind: NodeKind, index: Index, parent_index: Option<Index>, children: Vec<Index>) -> Node {
        Node {
            name: name.to_string(),
            kind,
            index,
            parent_index,
            depth: parent_index.map_or(0, |_| 1),
            offset: Position::new(index as f64, 10.0, 0.0),
            channels: Vec::new(),
            children,
            frames: Vec::new(),
        }
    }

    /// root(0) -> [end(1), arm(2)], two frames each.
    fn sample() -> Bvh {
        let mut nodes = vec![
            node("root", NodeKind::Root, 0, None, vec![1, 2]),
            node("end", NodeKind::EndSite, 1, Some(0), vec![]),
            node("arm", NodeKind::Joint, 2, Some(0), vec![]),
        ];
        nodes[1].name = END_SITE_NAME.to_string();
        for i in [0, 2] {
            for frame in 0..2 {
                let mut keyframe = Keyframe::new(frame as f64 * 0.5);
                keyframe.local_position = Position::new(1.0, 2.0, frame as f64);
                keyframe.rotation = Quaternion::new(0.0, 0.0, 1.0, 0.0);
                nodes[i].frames.push(keyframe);
            }
        }
        Bvh {
            nodes,
            num_frames: 2,
            frame_time: 0.5,
            fps: 2,
        }
    }

    #[test]
    fn test_flatten_includes_end_sites() {
        assert_eq!(flatten(&sample()), vec![0, 1, 2]);
    }

    #[test]
    fn test_skeleton_keeps_offsets_and_links() {
        let bones = build_skeleton(&sample());
        assert_eq!(bones.len(), 3);
        assert_eq!(bones[1].kind, NodeKind::EndSite);
        assert_eq!(bones[1].name, END_SITE_NAME);
        assert_eq!(bones[1].offset, Position::new(1.0, 10.0, 0.0));
        assert_eq!(bones[1].parent, Some(0));
        assert_eq!(bones[0].children, vec![1, 2]);
    }

    #[test]
    fn test_clip_tracks() {
        let clip = build_clip(&sample());
        assert_eq!(clip.name, "animation");
        assert_eq!(clip.duration, 0.5);

        let names: Vec<&str> = clip.tracks.iter().map(Track::name).collect();
        assert_eq!(
            names,
            vec![
                ".bones[root].position",
                ".bones[root].quaternion",
                ".bones[arm].position",
                ".bones[arm].quaternion",
            ]
        );

        let arm = clip.position_tracks().nth(1).unwrap();
        assert_eq!(arm.bone, "arm");
        assert_eq!(arm.bone_index, 2);
        assert_eq!(arm.times, vec![0.0, 0.5]);
        // offset (2, 10, 0) added to every sample
        assert_eq!(arm.flat_values(), vec![3.0, 12.0, 0.0, 3.0, 12.0, 1.0]);

        let rotation = clip.rotation_tracks().next().unwrap();
        assert_eq!(rotation.len(), 2);
        assert_eq!(rotation.flat_values(), vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_duplicate_names_are_not_renamed() {
        let mut bvh = sample();
        bvh.nodes[2].name = "root".to_string();
        let clip = build_clip(&bvh);
        let bones: Vec<&str> = clip.tracks.iter().map(Track::bone).collect();
        assert_eq!(bones, vec!["root", "root", "root", "root"]);
        assert_eq!(clip.tracks[0].name(), clip.tracks[2].name());
    }

    #[test]
    fn test_empty_motion() {
        let mut bvh = sample();
        for node in bvh.nodes.iter_mut() {
            node.frames.clear();
        }
        let animation = to_animation(&bvh);
        assert_eq!(animation.bones.len(), 3);
        assert_eq!(animation.clip.duration, 0.0);
        assert!(animation.clip.position_tracks().all(|track| track.is_empty()));
    }
}
