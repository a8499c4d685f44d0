//! Prioritized replay buffer.
use super::{BatchBase, GenericTransitionBatch, PerReplayBufferConfig, SumTree};
use crate::{ExperienceBufferBase, ReplayBufferBase, TransitionBatch};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A fixed-capacity prioritized replay buffer.
///
/// Transitions are stored in parallel arrays, indexed identically to the
/// leaf slots of the internal [`SumTree`]; every `push` writes the same
/// slot in both structures, so the tree's leaf indices double as data
/// indices. Entries are overwritten circularly and never deleted.
///
/// New transitions are seeded with `max_priority`, the largest priority
/// ever assigned, so they are sampled at least once before their true
/// TD-error is known. [`ReplayBufferBase::update_priority`] converts raw
/// TD-errors into priorities via `(|err| + eps)^alpha`; since `eps > 0`,
/// every written priority is strictly positive and the total weight is
/// positive whenever the buffer is non-empty.
///
/// # Type Parameters
///
/// * `O` - Storage of observations, implements [`BatchBase`]
/// * `A` - Storage of actions, implements [`BatchBase`]
pub struct PerReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    capacity: usize,

    /// Current insertion index, kept in lockstep with the sum tree's
    /// write cursor.
    i: usize,

    /// Current number of stored transitions.
    size: usize,

    obs: O,
    act: A,
    next_obs: O,
    reward: Vec<f32>,

    sum_tree: SumTree,

    /// Running upper bound on priorities ever assigned.
    max_priority: f32,

    eps: f32,
    alpha: f32,
    beta: f32,

    rng: StdRng,
}

impl<O, A> PerReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    #[inline]
    fn push_reward(&mut self, i: usize, b: &Vec<f32>) {
        let mut j = i;
        for r in b.iter() {
            self.reward[j] = *r;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    fn sample_reward(&self, ixs: &Vec<usize>) -> Vec<f32> {
        ixs.iter().map(|ix| self.reward[*ix]).collect()
    }

    /// Seeds the priorities of `n` newly written slots with the running
    /// maximum.
    fn seed_priority(&mut self, n: usize) {
        for j in 0..n {
            let slot = (self.i + j) % self.capacity;
            self.sum_tree.add(self.max_priority, slot);
        }
    }

    /// Returns the total priority weight.
    pub fn total_weight(&self) -> f32 {
        self.sum_tree.total()
    }

    /// Returns the priority currently stored for the given leaf index.
    pub fn priority(&self, ix: usize) -> f32 {
        self.sum_tree.weight(ix)
    }
}

impl<O, A> ExperienceBufferBase for PerReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Item = GenericTransitionBatch<O, A>;

    fn len(&self) -> usize {
        self.size
    }

    /// Adds transitions to the buffer, overwriting the oldest entries
    /// once it is full.
    fn push(&mut self, tr: Self::Item) -> Result<()> {
        let len = tr.len();
        let (obs, act, next_obs, reward, _, _) = tr.unpack();

        self.seed_priority(len);
        self.obs.push(self.i, obs);
        self.act.push(self.i, act);
        self.next_obs.push(self.i, next_obs);
        self.push_reward(self.i, &reward);

        self.i = (self.i + len) % self.capacity;
        self.size += len;
        if self.size >= self.capacity {
            self.size = self.capacity;
        }

        Ok(())
    }
}

impl<O, A> ReplayBufferBase for PerReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Config = PerReplayBufferConfig;
    type Batch = GenericTransitionBatch<O, A>;

    fn build(config: &Self::Config) -> Self {
        let capacity = config.capacity;
        Self {
            capacity,
            i: 0,
            size: 0,
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: vec![0.; capacity],
            sum_tree: SumTree::new(capacity),
            max_priority: config.eps,
            eps: config.eps,
            alpha: config.alpha,
            beta: config.beta,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Samples a batch with stratified proportional sampling.
    ///
    /// `[0, total_weight)` is partitioned into `size` equal-width
    /// segments and one cumulative value is drawn uniformly per segment,
    /// which guarantees coverage across the priority distribution even in
    /// small batches. Importance weights `(n * p_i)^(-beta)` are
    /// normalized by the batch maximum, so the largest weight in the
    /// returned batch is exactly 1.
    ///
    /// # Panics
    ///
    /// Panics if the buffer holds fewer than `size` transitions.
    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        assert!(
            size <= self.size,
            "buffer contains less samples ({}) than batch size ({})",
            self.size,
            size
        );

        let total = self.sum_tree.total();
        let segment = total / size as f32;

        let mut ixs = Vec::with_capacity(size);
        let mut priorities = Vec::with_capacity(size);
        for k in 0..size {
            let low = segment * k as f32;
            let cumsum = (low + segment * self.rng.gen::<f32>()).min(total);
            let (leaf_ix, priority, _slot) = self.sum_tree.get(cumsum);
            ixs.push(leaf_ix);
            priorities.push(priority);
        }

        let n = self.size as f32;
        let ws = priorities
            .iter()
            .map(|p| (n * p / total).powf(-self.beta))
            .collect::<Vec<_>>();
        let w_max = ws.iter().fold(f32::MIN, |m, &v| v.max(m));
        let weight = ws.iter().map(|w| w / w_max).collect::<Vec<_>>();

        Ok(Self::Batch {
            obs: self.obs.sample(&ixs),
            act: self.act.sample(&ixs),
            next_obs: self.next_obs.sample(&ixs),
            reward: self.sample_reward(&ixs),
            ix_sample: Some(ixs),
            weight: Some(weight),
        })
    }

    /// Converts raw TD-errors into priorities and writes them back into
    /// the sum tree.
    fn update_priority(&mut self, ixs: &Option<Vec<usize>>, td_errs: &Option<Vec<f32>>) {
        let ixs = ixs
            .as_ref()
            .expect("ixs should be Some(_) in update_priority()");
        let td_errs = td_errs
            .as_ref()
            .expect("td_errs should be Some(_) in update_priority()");
        for (&ix, &td_err) in ixs.iter().zip(td_errs.iter()) {
            let p = (td_err.abs() + self.eps).powf(self.alpha);
            self.sum_tree.update(ix, p);
            if p > self.max_priority {
                self.max_priority = p;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Row-major storage of fixed-dimension float vectors.
    #[derive(Clone, Debug)]
    struct VecObs {
        dim: usize,
        data: Vec<f32>,
    }

    impl VecObs {
        fn from_rows(rows: &[&[f32]]) -> Self {
            Self {
                dim: rows[0].len(),
                data: rows.iter().flat_map(|r| r.iter().copied()).collect(),
            }
        }
    }

    impl BatchBase for VecObs {
        fn new(capacity: usize) -> Self {
            Self {
                dim: 0,
                data: vec![0.; capacity * 2],
            }
        }

        fn push(&mut self, ix: usize, data: Self) {
            if self.dim == 0 {
                self.dim = data.dim;
                let capacity = self.data.len() / 2;
                self.data = vec![0.; capacity * self.dim];
            }
            let n = data.data.len() / data.dim;
            let capacity = self.data.len() / self.dim;
            for k in 0..n {
                let j = (ix + k) % capacity;
                self.data[j * self.dim..(j + 1) * self.dim]
                    .copy_from_slice(&data.data[k * data.dim..(k + 1) * data.dim]);
            }
        }

        fn sample(&self, ixs: &Vec<usize>) -> Self {
            let data = ixs
                .iter()
                .flat_map(|&ix| self.data[ix * self.dim..(ix + 1) * self.dim].to_vec())
                .collect();
            Self {
                dim: self.dim,
                data,
            }
        }
    }

    #[derive(Clone, Debug)]
    struct VecAct(Vec<i64>);

    impl BatchBase for VecAct {
        fn new(capacity: usize) -> Self {
            Self(vec![0; capacity])
        }

        fn push(&mut self, ix: usize, data: Self) {
            let capacity = self.0.len();
            for (k, a) in data.0.iter().enumerate() {
                self.0[(ix + k) % capacity] = *a;
            }
        }

        fn sample(&self, ixs: &Vec<usize>) -> Self {
            Self(ixs.iter().map(|&ix| self.0[ix]).collect())
        }
    }

    type Buffer = PerReplayBuffer<VecObs, VecAct>;

    fn transition(s: [f32; 2], a: i64, r: f32, s2: [f32; 2]) -> GenericTransitionBatch<VecObs, VecAct> {
        GenericTransitionBatch {
            obs: VecObs::from_rows(&[&s]),
            act: VecAct(vec![a]),
            next_obs: VecObs::from_rows(&[&s2]),
            reward: vec![r],
            ix_sample: None,
            weight: None,
        }
    }

    fn config(capacity: usize) -> PerReplayBufferConfig {
        PerReplayBufferConfig::default().capacity(capacity).seed(7)
    }

    #[test]
    fn test_ring_overwrite() {
        let mut buffer = Buffer::build(&config(4));
        for k in 0..7 {
            buffer
                .push(transition([k as f32, 0.], k, k as f32, [0., 0.]))
                .unwrap();
        }

        assert_eq!(buffer.len(), 4);
        // Slots 0..3 hold transitions 4, 5, 6, 3.
        assert_eq!(buffer.act.0, vec![4, 5, 6, 3]);
        assert_eq!(buffer.reward, vec![4., 5., 6., 3.]);
    }

    #[test]
    fn test_priority_roundtrip() {
        let mut buffer = Buffer::build(&config(4));
        for k in 0..4 {
            buffer.push(transition([0., 0.], k, 0., [0., 0.])).unwrap();
        }

        let errs = vec![0.5f32, 0.0, 2.0, 0.25];
        buffer.update_priority(&Some(vec![0, 1, 2, 3]), &Some(errs.clone()));

        let cfg = config(4);
        for (ix, e) in errs.iter().enumerate() {
            let expected = (e.abs() + cfg.eps).powf(cfg.alpha);
            assert_eq!(buffer.priority(ix), expected);
        }

        // max_priority tracks the largest priority ever written.
        let expected_max = (2.0f32 + cfg.eps).powf(cfg.alpha);
        assert_eq!(buffer.max_priority, expected_max);
    }

    #[test]
    fn test_new_entries_seeded_with_max_priority() {
        let mut buffer = Buffer::build(&config(4));
        for k in 0..4 {
            buffer.push(transition([0., 0.], k, 0., [0., 0.])).unwrap();
        }
        buffer.update_priority(&Some(vec![0]), &Some(vec![3.0]));
        let max_p = buffer.max_priority;

        // The next pushed transition overwrites slot 0 and inherits max_p.
        buffer.push(transition([1., 1.], 9, 1., [0., 0.])).unwrap();
        assert_eq!(buffer.priority(0), max_p);
    }

    #[test]
    fn test_equal_priorities_stratified_coverage() {
        // Four equal-weight leaves and four segments: each segment holds
        // exactly one leaf, so a batch of 4 covers all slots once and all
        // normalized weights are 1.
        let mut buffer = Buffer::build(&config(4));
        for k in 0..4 {
            buffer
                .push(transition([k as f32, -(k as f32)], k, 0.1, [0., 0.]))
                .unwrap();
        }
        buffer.update_priority(&Some(vec![0, 1, 2, 3]), &Some(vec![1.0; 4]));

        let batch = buffer.batch(4).unwrap();
        let mut ixs = batch.ix_sample.clone().unwrap();
        ixs.sort_unstable();
        assert_eq!(ixs, vec![0, 1, 2, 3]);

        for w in batch.weight.unwrap() {
            assert!((w - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_importance_weight_normalization() {
        let mut buffer = Buffer::build(&config(8));
        for k in 0..8 {
            buffer.push(transition([0., 0.], k, 0., [0., 0.])).unwrap();
        }
        buffer.update_priority(
            &Some((0..8).collect()),
            &Some(vec![0.1, 0.4, 1.5, 0.2, 3.0, 0.05, 0.9, 2.2]),
        );

        let batch = buffer.batch(8).unwrap();
        let weight = batch.weight.unwrap();
        let w_max = weight.iter().fold(f32::MIN, |m, &v| v.max(m));
        assert!((w_max - 1.0).abs() < 1e-6);
        for w in weight {
            assert!(w > 0.0 && w <= 1.0 + 1e-6);
        }
    }

    #[test]
    #[should_panic]
    fn test_batch_larger_than_fill_panics() {
        let mut buffer = Buffer::build(&config(8));
        buffer.push(transition([0., 0.], 0, 0., [0., 0.])).unwrap();
        let _ = buffer.batch(2);
    }
}
