//! Bounding volume hierarchy over indexed primitives.
//!
//! The tree is built top-down by sorting primitive centers along the longest
//! axis of the node box and splitting at the median. Nearest-primitive
//! queries descend the nearer child first and prune subtrees whose box is
//! farther than the best hit found so far.

use nalgebra::Point3;
use smallvec::SmallVec;

use super::aabb::Aabb;

/// BVH node containing either leaf primitives or child nodes.
#[derive(Debug)]
pub enum BvhNode {
    /// Leaf node containing primitive indices.
    Leaf {
        /// Bounding box of all primitives in this leaf.
        bbox: Aabb,
        /// Primitive indices stored in this leaf.
        items: SmallVec<[u32; 8]>,
    },
    /// Internal node with two children.
    Internal {
        /// Bounding box of all primitives in this subtree.
        bbox: Aabb,
        /// Left child node.
        left: Box<Self>,
        /// Right child node.
        right: Box<Self>,
    },
}

impl BvhNode {
    /// Get the bounding box of this node.
    pub fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Bounding volume hierarchy over a list of primitive boxes.
#[derive(Debug)]
pub struct Bvh {
    root: Option<BvhNode>,
    len: usize,
}

impl Bvh {
    /// Build a BVH from the boxes of the primitives, indexed by position.
    pub fn build(boxes: &[Aabb], max_leaf_size: usize) -> Self {
        if boxes.is_empty() {
            return Self { root: None, len: 0 };
        }

        let centers: Vec<Point3<f64>> = boxes.iter().map(Aabb::center).collect();
        let indices: Vec<u32> = (0..boxes.len() as u32).collect();
        let root = Self::build_recursive(boxes, &centers, indices, max_leaf_size.max(1));

        Self {
            root: Some(root),
            len: boxes.len(),
        }
    }

    fn build_recursive(
        boxes: &[Aabb],
        centers: &[Point3<f64>],
        mut indices: Vec<u32>,
        max_leaf_size: usize,
    ) -> BvhNode {
        let mut bbox = Aabb::empty();
        for &i in &indices {
            bbox.expand(&boxes[i as usize]);
        }

        if indices.len() <= max_leaf_size {
            return BvhNode::Leaf {
                bbox,
                items: indices.into_iter().collect(),
            };
        }

        // Split along the longest axis of the center cloud at the median
        let center_box = Aabb::from_points(indices.iter().map(|&i| &centers[i as usize]));
        let axis = center_box.longest_axis();
        indices.sort_by(|&a, &b| {
            centers[a as usize][axis]
                .partial_cmp(&centers[b as usize][axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let right_indices = indices.split_off(indices.len() / 2);
        let left = Self::build_recursive(boxes, centers, indices, max_leaf_size);
        let right = Self::build_recursive(boxes, centers, right_indices, max_leaf_size);

        BvhNode::Internal {
            bbox,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of primitives in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no primitives.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Find the primitive nearest to `p`.
    ///
    /// `distance_squared(i)` returns the squared distance from `p` to
    /// primitive `i`. Returns the index and squared distance of the nearest
    /// primitive, or `None` for an empty tree. Ties go to the primitive
    /// visited first.
    pub fn nearest<F>(&self, p: &Point3<f64>, mut distance_squared: F) -> Option<(usize, f64)>
    where
        F: FnMut(usize) -> f64,
    {
        let root = self.root.as_ref()?;
        let mut best: Option<(usize, f64)> = None;
        let mut stack: Vec<&BvhNode> = vec![root];

        while let Some(node) = stack.pop() {
            let bound = best.map_or(f64::INFINITY, |(_, d)| d);
            if node.bbox().distance_squared(p) >= bound {
                continue;
            }

            match node {
                BvhNode::Leaf { items, .. } => {
                    for &i in items {
                        let d = distance_squared(i as usize);
                        if best.map_or(true, |(_, bd)| d < bd) {
                            best = Some((i as usize, d));
                        }
                    }
                }
                BvhNode::Internal { left, right, .. } => {
                    let dl = left.bbox().distance_squared(p);
                    let dr = right.bbox().distance_squared(p);
                    // Pushed last is visited first
                    if dl <= dr {
                        stack.push(right);
                        stack.push(left);
                    } else {
                        stack.push(left);
                        stack.push(right);
                    }
                }
            }
        }

        best
    }
}
