//! Sum tree for prioritized sampling.
//!
//! A complete binary tree over `size` leaf slots. Leaves hold priority
//! weights, internal nodes hold the sum of their children, and the root
//! holds the total weight. Sampling a cumulative value in `[0, total]`
//! descends from the root in O(log size).

/// Sum tree over a fixed number of leaf slots.
///
/// Leaves are written circularly: once all slots have been used, `add`
/// overwrites the oldest leaf. The tree is never resized.
#[derive(Debug)]
pub struct SumTree {
    /// Number of leaf slots.
    size: usize,

    /// `2 * size - 1` nodes; `nodes[0]` is the root.
    nodes: Vec<f32>,

    /// Opaque slot reference per leaf.
    data: Vec<usize>,

    /// Next leaf index to overwrite.
    write: usize,

    /// Number of leaves ever written, capped at `size`.
    n_samples: usize,
}

impl SumTree {
    /// Creates a tree with `size` leaf slots, all weights zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0);
        Self {
            size,
            nodes: vec![0f32; 2 * size - 1],
            data: vec![0; size],
            write: 0,
            n_samples: 0,
        }
    }

    /// Total weight, i.e. the sum over all leaves.
    pub fn total(&self) -> f32 {
        self.nodes[0]
    }

    /// Number of leaves written so far, capped at the tree size.
    pub fn len(&self) -> usize {
        self.n_samples
    }

    /// Returns the weight currently stored at `leaf_ix`.
    pub fn weight(&self, leaf_ix: usize) -> f32 {
        assert!(leaf_ix < self.size);
        self.nodes[leaf_ix + self.size - 1]
    }

    fn propagate(&mut self, ix: usize, change: f32) {
        let parent = (ix - 1) / 2;
        self.nodes[parent] += change;
        if parent != 0 {
            self.propagate(parent, change);
        }
    }

    /// Overwrites the weight at `leaf_ix` and propagates the delta to the
    /// root.
    ///
    /// Negative weights are not rejected here; callers are expected to
    /// pass non-negative priorities.
    pub fn update(&mut self, leaf_ix: usize, value: f32) {
        assert!(leaf_ix < self.size);

        let ix = leaf_ix + self.size - 1;
        let change = value - self.nodes[ix];
        self.nodes[ix] = value;
        if ix != 0 {
            self.propagate(ix, change);
        }
    }

    /// Writes `data` and `value` into the next leaf slot, overwriting the
    /// oldest entry once the tree is full.
    pub fn add(&mut self, value: f32, data: usize) {
        self.data[self.write] = data;
        self.update(self.write, value);

        self.write = (self.write + 1) % self.size;
        if self.n_samples < self.size {
            self.n_samples += 1;
        }
    }

    fn retrieve(&self, ix: usize, s: f32) -> usize {
        let left = 2 * ix + 1;

        if left >= self.nodes.len() {
            return ix;
        }

        // Ties go to the left subtree, which makes sampling deterministic
        // for a given cumulative value.
        if s <= self.nodes[left] {
            self.retrieve(left, s)
        } else {
            self.retrieve(left + 1, s - self.nodes[left])
        }
    }

    /// Samples the leaf where the prefix sum of weights reaches `cumsum`.
    ///
    /// Returns `(leaf_index, leaf_weight, leaf_data)`. `cumsum` must lie
    /// in `[0, total]`; violating this is a caller error.
    pub fn get(&self, cumsum: f32) -> (usize, f32, usize) {
        assert!(
            cumsum >= 0.0 && cumsum <= self.total(),
            "cumsum {} out of range [0, {}]",
            cumsum,
            self.total()
        );

        let ix = self.retrieve(0, cumsum);
        let leaf_ix = ix + 1 - self.size;

        (leaf_ix, self.nodes[ix], self.data[leaf_ix])
    }
}
