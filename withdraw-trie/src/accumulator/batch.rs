use tracing::trace;

use crate::accumulator::{bit_length, hash_nodes, Frontier, ZeroHashes, H256};

/// One row of the fan-in cache. Holds the nodes of a single depth whose
/// indices fall in `[offset, offset + nodes.len())`.
#[derive(Debug)]
struct Level {
    offset: u64,
    nodes: Vec<H256>,
}

impl Level {
    /// A row wide enough for `first..=last` and both of their siblings.
    fn spanning(first: u64, last: u64) -> Self {
        let offset = first & !1;
        let len = ((last | 1) - offset + 1) as usize;
        Self {
            offset,
            nodes: vec![H256::zero(); len],
        }
    }

    fn get(&self, index: u64) -> H256 {
        self.nodes[(index - self.offset) as usize]
    }

    fn set(&mut self, index: u64, node: H256) {
        let slot = (index - self.offset) as usize;
        self.nodes[slot] = node;
    }
}

/// Every node touched by a batch append, from the new leaves up to the root
/// of the post-batch trie.
///
/// Proofs for the batch are read out of this cache instead of being re-derived
/// leaf by leaf, so a batch of `n` leaves costs about `n + log(total)` hashes.
#[derive(Debug)]
pub(crate) struct BatchCache {
    levels: Vec<Level>,
}

impl BatchCache {
    /// Build the cache for appending `leaves` at `first` onward to a trie
    /// whose current frontier is `frontier`.
    ///
    /// `leaves` must not be empty.
    pub(crate) fn fan_in(
        zeroes: &ZeroHashes,
        frontier: &Frontier,
        first: u64,
        leaves: &[H256],
    ) -> Self {
        debug_assert!(!leaves.is_empty());
        let last = first + leaves.len() as u64 - 1;
        let height = bit_length(last);

        let mut levels: Vec<Level> = (0..=height)
            .map(|depth| Level::spanning(first >> depth, last >> depth))
            .collect();

        // Completed left subtrees already in the trie are the left siblings
        // of the first new node at every depth where that node is a right
        // child.
        for (depth, level) in levels.iter_mut().enumerate().take(bit_length(first)) {
            let index = first >> depth;
            if index & 1 == 1 {
                level.set(index ^ 1, frontier[depth]);
            }
        }

        for (offset, leaf) in leaves.iter().enumerate() {
            levels[0].set(first + offset as u64, *leaf);
        }

        let mut min_index = first;
        let mut max_index = last;
        let mut depth = 0;

        while max_index > 0 {
            if min_index & 1 == 1 {
                min_index -= 1;
            }
            if max_index & 1 == 0 {
                levels[depth].set(max_index ^ 1, zeroes[depth]);
            }

            trace!(depth, min_index, max_index, "Hashing batch level");
            for i in (min_index..=max_index).step_by(2) {
                let parent = hash_nodes(levels[depth].get(i), levels[depth].get(i ^ 1));
                levels[depth + 1].set(i >> 1, parent);
            }

            min_index >>= 1;
            max_index >>= 1;
            depth += 1;
        }

        Self { levels }
    }

    /// Height of the trie once the batch is applied
    pub(crate) fn height(&self) -> usize {
        self.levels.len() - 1
    }

    /// Root of the trie once the batch is applied
    pub(crate) fn root(&self) -> H256 {
        self.levels[self.height()].get(0)
    }

    /// Inclusion proof for a leaf of the batch, valid against [`Self::root`].
    pub(crate) fn proof(&self, index: u64) -> Vec<H256> {
        self.levels[..self.height()]
            .iter()
            .enumerate()
            .map(|(depth, level)| level.get((index >> depth) ^ 1))
            .collect()
    }
}
