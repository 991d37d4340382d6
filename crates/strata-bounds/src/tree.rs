//! Quad-partition tree of tile elevation bounds.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BoundsError;

/// Elevation range of one tile or region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileBound {
    pub min: f32,
    pub max: f32,
}

impl TileBound {
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Smallest range containing both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// A node covering the tile rectangle `origin .. origin + extent`.
///
/// Children are ordered \[bottom-left, bottom-right, top-left, top-right\].
/// A quadrant with no tiles, which happens when an odd extent is halved, is
/// `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundNode {
    pub min: f32,
    pub max: f32,
    /// Lower tile corner of the covered rectangle.
    pub origin: [u32; 2],
    /// Covered rectangle size in tiles.
    pub extent: [u32; 2],
    /// Linear tile index `y * width + x`, set on leaves only.
    pub tile_index: Option<u32>,
    /// Quadrants in the order above; all `None` on leaves.
    pub children: [Option<Box<BoundNode>>; 4],
}

impl BoundNode {
    /// The node's elevation range.
    #[must_use]
    pub fn bound(&self) -> TileBound {
        TileBound::new(self.min, self.max)
    }

    /// Returns true if this node covers a single tile.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.tile_index.is_some()
    }

    /// Present children in order.
    pub fn children(&self) -> impl Iterator<Item = &BoundNode> {
        self.children.iter().flatten().map(Box::as_ref)
    }

    /// The covered rectangle in heightmap samples as `(origin, extent)`.
    ///
    /// Adjacent tiles share their boundary row and column, so tiles advance by
    /// `tile_size - 1` samples and a run of `n` tiles spans
    /// `n * (tile_size - 1) + 1` samples.
    #[must_use]
    pub fn pixel_rect(&self, tile_size: u32) -> ([u32; 2], [u32; 2]) {
        let stride = tile_size.saturating_sub(1);
        (
            [self.origin[0] * stride, self.origin[1] * stride],
            [self.extent[0] * stride + 1, self.extent[1] * stride + 1],
        )
    }

    fn intersects(&self, origin: [u32; 2], extent: [u32; 2]) -> bool {
        (0..2).all(|i| {
            self.origin[i] < origin[i] + extent[i] && origin[i] < self.origin[i] + self.extent[i]
        })
    }

    fn inside(&self, origin: [u32; 2], extent: [u32; 2]) -> bool {
        (0..2).all(|i| {
            origin[i] <= self.origin[i] && self.origin[i] + self.extent[i] <= origin[i] + extent[i]
        })
    }

    fn query(&self, origin: [u32; 2], extent: [u32; 2]) -> Option<TileBound> {
        if !self.intersects(origin, extent) {
            return None;
        }
        if self.inside(origin, extent) {
            return Some(self.bound());
        }
        self.children()
            .filter_map(|child| child.query(origin, extent))
            .reduce(TileBound::union)
    }

    fn count_leaves(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children().map(BoundNode::count_leaves).sum()
        }
    }

    fn depth(&self) -> usize {
        1 + self.children().map(BoundNode::depth).max().unwrap_or(0)
    }
}

/// Read-only bound hierarchy over a tile grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundTree {
    /// Grid width in tiles.
    pub width: u32,
    /// Grid height in tiles.
    pub height: u32,
    /// Node covering the whole grid.
    pub root: BoundNode,
}

impl BoundTree {
    /// Build the tree from row-major per-tile bounds.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError::EmptyGrid`] for a grid without tiles and
    /// [`BoundsError::SizeMismatch`] if `bounds` is not `width * height` long.
    pub fn build(width: u32, height: u32, bounds: &[TileBound]) -> Result<Self, BoundsError> {
        if width == 0 || height == 0 {
            return Err(BoundsError::EmptyGrid { width, height });
        }
        let expected = width as usize * height as usize;
        if bounds.len() != expected {
            return Err(BoundsError::SizeMismatch {
                expected,
                actual: bounds.len(),
            });
        }

        let root = build_node(width, bounds, [0, 0], [width, height]);
        let tree = Self {
            width,
            height,
            root,
        };
        debug!(
            width,
            height,
            depth = tree.depth(),
            min = tree.root.min,
            max = tree.root.max,
            "built bound tree"
        );
        Ok(tree)
    }

    /// The node covering the whole grid.
    #[must_use]
    pub fn root(&self) -> &BoundNode {
        &self.root
    }

    /// Number of single-tile leaves; equals `width * height`.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.root.count_leaves()
    }

    /// Levels from the root to the deepest leaf, inclusive.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Elevation range over the tile rectangle `origin .. origin + extent`,
    /// or `None` if it covers no tiles.
    #[must_use]
    pub fn query(&self, origin: [u32; 2], extent: [u32; 2]) -> Option<TileBound> {
        if extent[0] == 0 || extent[1] == 0 {
            return None;
        }
        self.root.query(origin, extent)
    }

    /// Serialize as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, BoundsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a tree produced by [`to_json`](Self::to_json).
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError::Json`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, BoundsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize as pretty-printed RON for inspection and diffing.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError::Ron`] if serialization fails.
    pub fn to_ron(&self) -> Result<String, BoundsError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }
}

fn build_node(width: u32, bounds: &[TileBound], origin: [u32; 2], extent: [u32; 2]) -> BoundNode {
    if extent == [1, 1] {
        let index = origin[1] * width + origin[0];
        let bound = bounds[index as usize];
        return BoundNode {
            min: bound.min,
            max: bound.max,
            origin,
            extent,
            tile_index: Some(index),
            children: [None, None, None, None],
        };
    }

    let w0 = extent[0].div_ceil(2);
    let h0 = extent[1].div_ceil(2);
    let w1 = extent[0] - w0;
    let h1 = extent[1] - h0;
    let quadrant = |dx: u32, dy: u32, w: u32, h: u32| {
        (w > 0 && h > 0).then(|| {
            Box::new(build_node(width, bounds, [origin[0] + dx, origin[1] + dy], [w, h]))
        })
    };
    let children = [
        quadrant(0, 0, w0, h0),
        quadrant(w0, 0, w1, h0),
        quadrant(0, h0, w0, h1),
        quadrant(w0, h0, w1, h1),
    ];

    let bound = children
        .iter()
        .flatten()
        .map(|child| child.bound())
        .reduce(TileBound::union)
        .unwrap_or(TileBound::new(f32::INFINITY, f32::NEG_INFINITY));
    BoundNode {
        min: bound.min,
        max: bound.max,
        origin,
        extent,
        tile_index: None,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: u32, height: u32) -> Vec<TileBound> {
        (0..width * height)
            .map(|i| TileBound::new(i as f32, i as f32 + 0.5))
            .collect()
    }

    #[test]
    fn test_single_tile_is_a_leaf() {
        let tree = BoundTree::build(1, 1, &[TileBound::new(-2.0, 3.0)]).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().tile_index, Some(0));
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_root_is_union_of_all_tiles() {
        let tree = BoundTree::build(4, 4, &ramp(4, 4)).unwrap();
        assert_eq!(tree.root().bound(), TileBound::new(0.0, 15.5));
        assert_eq!(tree.leaf_count(), 16);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_children_follow_quadrant_order() {
        let tree = BoundTree::build(2, 2, &ramp(2, 2)).unwrap();
        let origins: Vec<[u32; 2]> = tree.root().children().map(|c| c.origin).collect();
        assert_eq!(origins, vec![[0, 0], [1, 0], [0, 1], [1, 1]]);
        let indices: Vec<u32> = tree
            .root()
            .children()
            .filter_map(|c| c.tile_index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_ragged_grid_has_empty_quadrants() {
        let tree = BoundTree::build(3, 1, &ramp(3, 1)).unwrap();
        let root = tree.root();
        assert!(root.children[0].is_some());
        assert!(root.children[1].is_some());
        assert!(root.children[2].is_none());
        assert!(root.children[3].is_none());
        assert_eq!(root.children[0].as_ref().unwrap().extent, [2, 1]);
        assert_eq!(tree.leaf_count(), 3);

        let tree = BoundTree::build(5, 3, &ramp(5, 3)).unwrap();
        assert_eq!(tree.leaf_count(), 15);
        assert_eq!(tree.root().bound(), TileBound::new(0.0, 14.5));
    }

    #[test]
    fn test_internal_nodes_bound_their_leaves() {
        fn check(node: &BoundNode, bounds: &[TileBound], width: u32) {
            for y in node.origin[1]..node.origin[1] + node.extent[1] {
                for x in node.origin[0]..node.origin[0] + node.extent[0] {
                    let b = bounds[(y * width + x) as usize];
                    assert!(node.min <= b.min && b.max <= node.max);
                }
            }
            node.children().for_each(|c| check(c, bounds, width));
        }
        let bounds: Vec<TileBound> = (0..7 * 6)
            .map(|i| {
                let v = ((i * 37) % 11) as f32;
                TileBound::new(-v, v * 2.0)
            })
            .collect();
        let tree = BoundTree::build(7, 6, &bounds).unwrap();
        check(tree.root(), &bounds, 7);
    }

    #[test]
    fn test_query_rectangles() {
        let tree = BoundTree::build(4, 4, &ramp(4, 4)).unwrap();
        assert_eq!(tree.query([0, 0], [4, 4]), Some(tree.root().bound()));
        assert_eq!(tree.query([1, 1], [2, 2]), Some(TileBound::new(5.0, 10.5)));
        assert_eq!(tree.query([3, 0], [1, 1]), Some(TileBound::new(3.0, 3.5)));
        assert_eq!(tree.query([2, 3], [5, 5]), Some(TileBound::new(14.0, 15.5)));
        assert_eq!(tree.query([4, 0], [1, 1]), None);
        assert_eq!(tree.query([0, 0], [0, 3]), None);
    }

    #[test]
    fn test_pixel_rect_accounts_for_shared_edges() {
        let tree = BoundTree::build(3, 2, &ramp(3, 2)).unwrap();
        assert_eq!(tree.root().pixel_rect(257), ([0, 0], [769, 513]));
        let second = tree.root().children().nth(1).unwrap();
        assert_eq!(second.pixel_rect(257), ([512, 0], [257, 257]));
    }

    #[test]
    fn test_json_round_trip_is_exact() {
        let bounds: Vec<TileBound> = (0..5 * 3)
            .map(|i| TileBound::new(i as f32 * 0.1 - 3.3, i as f32 * 1.7 + 0.01))
            .collect();
        let tree = BoundTree::build(5, 3, &bounds).unwrap();
        let json = tree.to_json().unwrap();
        let restored = BoundTree::from_json(&json).unwrap();
        assert_eq!(restored, tree);
    }

    #[test]
    fn test_ron_is_readable() {
        let tree = BoundTree::build(2, 1, &ramp(2, 1)).unwrap();
        let text = tree.to_ron().unwrap();
        assert!(text.contains("tile_index"));
        assert!(text.contains("children"));
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            BoundTree::build(0, 3, &[]),
            Err(BoundsError::EmptyGrid { width: 0, height: 3 })
        ));
        assert!(matches!(
            BoundTree::build(2, 2, &ramp(2, 1)),
            Err(BoundsError::SizeMismatch { expected: 4, actual: 2 })
        ));
        assert!(matches!(
            BoundTree::from_json("{\"width\": 1}"),
            Err(BoundsError::Json(_))
        ));
    }
}
