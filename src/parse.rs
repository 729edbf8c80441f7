use crate::error::{BvhError, Result};
use crate::types::*;
use crate::utils::{parse_real, Line, LineCursor};
use cgmath::Deg;
use log::{debug, trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_JOINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:(ROOT|JOINT))\s+(\S+)$").expect("joint declaration pattern is valid")
});
static RE_END_SITE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i:END\s+SITE)$").expect("end site pattern is valid"));

/// Knobs controlling how strictly a document is read.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Reject frame lines carrying more values than the hierarchy declares channels.
    /// Frame lines with too few values are always rejected.
    pub strict_frame_values: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            strict_frame_values: true,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict_frame_values(mut self, strict: bool) -> Self {
        self.strict_frame_values = strict;
        self
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn expect_keyword(line: Line, keyword: &'static str) -> Result<()> {
    if line.text.eq_ignore_ascii_case(keyword) {
        Ok(())
    } else {
        Err(BvhError::MissingKeyword {
            line: line.number,
            expected: keyword,
            found: line.text.to_string(),
        })
    }
}

/// Parse the HIERARCHY block into a node arena in preorder.
fn parse_hierarchy(cursor: &mut LineCursor) -> Result<Vec<Node>> {
    expect_keyword(cursor.next_line("HIERARCHY")?, "HIERARCHY")?;

    let mut nodes: Vec<Node> = Vec::new();
    let declaration = cursor.next_line("ROOT declaration")?;
    parse_node(cursor, declaration, None, 0, &mut nodes)?;

    debug!(
        "Parsed hierarchy: {} nodes, {} channels",
        nodes.len(),
        nodes.iter().map(|node| node.channels.len()).sum::<usize>()
    );
    Ok(nodes)
}

fn parse_declaration(line: Line, is_root: bool) -> Result<(NodeKind, String)> {
    if !is_root && RE_END_SITE.is_match(line.text) {
        return Ok((NodeKind::EndSite, END_SITE_NAME.to_string()));
    }

    let malformed = || BvhError::MalformedDeclaration {
        line: line.number,
        found: line.text.to_string(),
    };
    let captures = RE_JOINT.captures(line.text).ok_or_else(malformed)?;
    let kind = if captures[1].eq_ignore_ascii_case("ROOT") {
        NodeKind::Root
    } else {
        NodeKind::Joint
    };
    // the root has to be declared as ROOT and nothing below it may be
    if is_root != (kind == NodeKind::Root) {
        return Err(malformed());
    }
    Ok((kind, captures[2].to_string()))
}

fn parse_offset(line: Line) -> Result<Position> {
    let tokens = line.tokens();
    if !tokens[0].eq_ignore_ascii_case("OFFSET") {
        return Err(BvhError::MissingKeyword {
            line: line.number,
            expected: "OFFSET",
            found: line.text.to_string(),
        });
    }
    if tokens.len() != 4 {
        return Err(BvhError::OffsetArity {
            line: line.number,
            count: tokens.len() - 1,
        });
    }

    let mut values = [0.0; 3];
    for (value, token) in values.iter_mut().zip(&tokens[1..]) {
        *value = parse_real(token).ok_or_else(|| BvhError::InvalidOffsetValue {
            line: line.number,
            token: token.to_string(),
        })?;
    }
    Ok(Position::new(values[0], values[1], values[2]))
}

fn parse_channels(line: Line) -> Result<Vec<Channel>> {
    let tokens = line.tokens();
    if !tokens[0].eq_ignore_ascii_case("CHANNELS") {
        return Err(BvhError::MissingChannels {
            line: line.number,
            found: line.text.to_string(),
        });
    }

    let count_token = tokens.get(1).copied().unwrap_or_default();
    let declared = count_token
        .parse::<usize>()
        .map_err(|_| BvhError::InvalidChannelCount {
            line: line.number,
            token: count_token.to_string(),
        })?;
    let names = &tokens[2.min(tokens.len())..];
    if names.len() != declared {
        return Err(BvhError::ChannelCountMismatch {
            line: line.number,
            declared,
            found: names.len(),
        });
    }

    names
        .iter()
        .map(|name| {
            name.parse::<Channel>().map_err(|_| BvhError::InvalidChannel {
                line: line.number,
                token: name.to_string(),
            })
        })
        .collect()
}

/// Recursive descent over one node definition, starting after its declaration line has been read.
/// The node is pushed onto `nodes` before its children so the arena ends up in preorder.
fn parse_node(
    cursor: &mut LineCursor,
    declaration: Line,
    parent_index: Option<Index>,
    depth: Depth,
    nodes: &mut Vec<Node>,
) -> Result<Index> {
    let (kind, name) = parse_declaration(declaration, parent_index.is_none())?;

    let brace = cursor.next_line("{")?;
    if brace.text != "{" {
        return Err(BvhError::MissingBrace {
            line: brace.number,
            found: brace.text.to_string(),
        });
    }

    let offset = parse_offset(cursor.next_line("OFFSET")?)?;
    let channels = if kind == NodeKind::EndSite {
        Vec::new()
    } else {
        parse_channels(cursor.next_line("CHANNELS")?)?
    };

    let index = nodes.len();
    nodes.push(Node {
        name,
        kind,
        index,
        parent_index,
        depth,
        offset,
        channels,
        children: Vec::new(),
        frames: Vec::new(),
    });

    loop {
        let line = cursor.next_line("}")?;
        if line.text == "}" {
            return Ok(index);
        }
        if kind == NodeKind::EndSite {
            return Err(BvhError::MissingBrace {
                line: line.number,
                found: line.text.to_string(),
            });
        }
        let child = parse_node(cursor, line, Some(index), depth + 1, nodes)?;
        nodes[index].children.push(child);
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Distribute one frame line over the hierarchy, appending exactly one keyframe to every non end site node.
///
/// `nodes` must be in preorder; values are consumed node by node, then channel by channel in declaration order.
/// Rotation channels are right-multiplied onto the accumulated rotation (`rotation = rotation * increment`).
pub(crate) fn read_frame(
    line: Line,
    time: f64,
    nodes: &mut [Node],
    options: &ParseOptions,
) -> Result<()> {
    let tokens = line.tokens();
    let expected: usize = nodes.iter().map(|node| node.channels.len()).sum();
    let too_few = tokens.len() < expected;
    if too_few || (options.strict_frame_values && tokens.len() > expected) {
        return Err(BvhError::FrameValueCount {
            line: line.number,
            expected,
            found: tokens.len(),
        });
    }

    let mut values = tokens.iter();
    let mut keyframes = Vec::with_capacity(nodes.len());
    for node in nodes.iter() {
        if node.is_end_site() {
            continue;
        }
        let mut keyframe = Keyframe::new(time);
        for &channel in &node.channels {
            // the length check above guarantees a value for every channel
            let Some(&token) = values.next() else {
                return Err(BvhError::FrameValueCount {
                    line: line.number,
                    expected,
                    found: tokens.len(),
                });
            };
            let value = parse_real(token).ok_or_else(|| BvhError::InvalidChannelValue {
                line: line.number,
                token: token.to_string(),
            })?;

            if channel.is_rotation() {
                let increment = Quaternion::from_axis_angle(channel.axis().unit(), Deg(value));
                keyframe.rotation = keyframe.rotation * increment;
            } else {
                match channel.axis() {
                    Axis::X => keyframe.local_position.x = value,
                    Axis::Y => keyframe.local_position.y = value,
                    Axis::Z => keyframe.local_position.z = value,
                }
            }
        }
        keyframes.push(keyframe);
    }

    // only touch the nodes once the whole line is known to be valid
    let targets = nodes.iter_mut().filter(|node| !node.is_end_site());
    for (node, keyframe) in targets.zip(keyframes) {
        node.frames.push(keyframe);
    }
    Ok(())
}

/// Parse the MOTION block, filling `frames` on every non end site node.
fn parse_motion(
    cursor: &mut LineCursor,
    nodes: &mut [Node],
    options: &ParseOptions,
) -> Result<(usize, f64)> {
    expect_keyword(cursor.next_line("MOTION")?, "MOTION")?;

    let header = cursor.next_line("Frames")?;
    let num_frames = header
        .tokens()
        .get(1)
        .and_then(|token| token.parse::<usize>().ok())
        .ok_or_else(|| BvhError::InvalidFrameCount {
            line: header.number,
            found: header.text.to_string(),
        })?;

    let header = cursor.next_line("Frame Time")?;
    let frame_time = header
        .tokens()
        .get(2)
        .and_then(|token| parse_real(token))
        .filter(|time| *time >= 0.0)
        .ok_or_else(|| BvhError::InvalidFrameTime {
            line: header.number,
            found: header.text.to_string(),
        })?;

    debug!("Reading {} frames, frame time {}", num_frames, frame_time);

    // a hierarchy without channels has empty frame lines, which must not be skipped
    let has_channels = nodes.iter().any(|node| !node.channels.is_empty());
    for frame in 0..num_frames {
        let expected = format!("frame {} of {}", frame + 1, num_frames);
        let line = if has_channels {
            cursor.next_line(&expected)?
        } else {
            cursor.next_raw_line(&expected)?
        };
        let time = frame as f64 * frame_time;
        trace!("Frame {} at {}", frame, time);
        read_frame(line, time, nodes, options)?;
    }

    let trailing = cursor.remaining();
    if let Some(first) = trailing.first() {
        warn!(
            "Ignoring {} line(s) after the last frame, starting at line {}",
            trailing.len(),
            first.number
        );
    }

    Ok((num_frames, frame_time))
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Parse a complete document from lines. Nothing is returned unless every section is valid.
pub fn parse_lines(lines: &[&str], options: &ParseOptions) -> Result<Bvh> {
    let mut cursor = LineCursor::new(lines);
    let mut nodes = parse_hierarchy(&mut cursor)?;
    let (num_frames, frame_time) = parse_motion(&mut cursor, &mut nodes, options)?;

    let fps = if frame_time > 0.0 {
        (1.0 / frame_time).round() as u32
    } else {
        0
    };

    Ok(Bvh {
        nodes,
        num_frames,
        frame_time,
        fps,
    })
}

/// Parse a .bvh document held in memory with the given options.
pub fn parse_bvh_with(source: &str, options: &ParseOptions) -> Result<Bvh> {
    let lines: Vec<&str> = source.lines().collect();
    parse_lines(&lines, options)
}

/// Parse a .bvh document held in memory.
pub fn parse_bvh(source: &str) -> Result<Bvh> {
    parse_bvh_with(source, &ParseOptions::default())
}
