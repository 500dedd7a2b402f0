//! # Merkle tree builder
//!
//! Binary hash trees over `2^height` leaves, shared by FORS and the hypertree. Leaves come
//! from a caller supplied function of the leaf index; internal nodes are
//! `H(PK.seed, ADRS, left || right)` where `ADRS` is the tree address of the caller with
//! the tree height and tree index words set to the position of the node.
//!
//! Several trees may share one address space: FORS places its `k` trees side by side, so a
//! tree is addressed by `idx_offset`, the absolute index of its first leaf. The index of a
//! node at height `h` is then `(idx_offset + i) >> h` for any leaf `i` below it.
//!
//! The root and an authentication path are computed in a single left-to-right pass that
//! keeps one node per height on a stack, so no more than `height + 1` nodes are held at once.

use crate::adrs::Adrs;
use crate::hash::SpxHasher;

/// Computes the root of a tree and the authentication path of leaf `leaf_idx`.
///
/// # Arguments
///
/// * `hasher` - The hash collaborator.
/// * `tree_adrs` - Address of the tree, with its type (and key pair for FORS) already set.
/// * `leaf_idx` - Index of the leaf whose authentication path is collected, relative to the
///   first leaf of the tree.
/// * `idx_offset` - Absolute index of the first leaf of the tree.
/// * `height` - Height of the tree.
/// * `gen_leaf` - Produces the `n`-byte leaf at a given absolute index.
///
/// # Returns
///
/// A tuple containing:
/// * `Vec<u8>` - The `n`-byte root.
/// * `Vec<u8>` - The `height * n`-byte authentication path, ordered leaf to root.
pub fn treehash<H, F>(
    hasher: &H,
    tree_adrs: &Adrs,
    leaf_idx: u32,
    idx_offset: u32,
    height: usize,
    mut gen_leaf: F,
) -> (Vec<u8>, Vec<u8>)
where
    H: SpxHasher,
    F: FnMut(u32) -> Vec<u8>,
{
    let n = hasher.n();
    let max_idx = ((1_u64 << height) - 1) as u32;

    let mut stack = vec![0u8; height * n];
    let mut auth_path = vec![0u8; height * n];
    let mut root = vec![0u8; n];
    // `current[..n]` holds the left sibling, `current[n..]` the node being climbed.
    let mut current = vec![0u8; 2 * n];
    let mut parent = vec![0u8; n];

    for idx in 0..=max_idx {
        let leaf = gen_leaf(idx + idx_offset);
        current[n..].copy_from_slice(&leaf[..n]);

        let mut internal_idx_offset = idx_offset;
        let mut internal_idx = idx;
        let mut internal_leaf = leaf_idx;
        let mut h = 0;

        while h < height {
            if internal_idx ^ internal_leaf == 1 {
                auth_path[h * n..(h + 1) * n].copy_from_slice(&current[n..]);
            }

            // A left child waits on the stack for its sibling.
            if internal_idx & 1 == 0 && idx < max_idx {
                break;
            }

            internal_idx_offset >>= 1;
            let node_adrs = tree_adrs
                .with_tree_height(h as u32 + 1)
                .with_tree_index(internal_idx / 2 + internal_idx_offset);

            current[..n].copy_from_slice(&stack[h * n..(h + 1) * n]);
            hasher.thash(&mut parent, &current, &node_adrs);
            current[n..].copy_from_slice(&parent);

            h += 1;
            internal_idx >>= 1;
            internal_leaf >>= 1;
        }

        if h == height {
            root.copy_from_slice(&current[n..]);
        } else {
            stack[h * n..(h + 1) * n].copy_from_slice(&current[n..]);
        }
    }

    (root, auth_path)
}

/// Computes only the root of a tree. See [`treehash`].
pub fn build_root<H, F>(
    hasher: &H,
    tree_adrs: &Adrs,
    idx_offset: u32,
    height: usize,
    gen_leaf: F,
) -> Vec<u8>
where
    H: SpxHasher,
    F: FnMut(u32) -> Vec<u8>,
{
    treehash(hasher, tree_adrs, 0, idx_offset, height, gen_leaf).0
}

/// Computes only the authentication path of `leaf_idx`. See [`treehash`].
pub fn auth_path<H, F>(
    hasher: &H,
    tree_adrs: &Adrs,
    leaf_idx: u32,
    idx_offset: u32,
    height: usize,
    gen_leaf: F,
) -> Vec<u8>
where
    H: SpxHasher,
    F: FnMut(u32) -> Vec<u8>,
{
    treehash(hasher, tree_adrs, leaf_idx, idx_offset, height, gen_leaf).1
}

/// Computes a root node given a leaf and an authentication path.
///
/// At each height the running node is a right child iff the corresponding bit of
/// `leaf_idx` is set, in which case the path element goes on the left.
pub fn root_from_path<H: SpxHasher>(
    hasher: &H,
    leaf: &[u8],
    leaf_idx: u32,
    idx_offset: u32,
    auth_path: &[u8],
    height: usize,
    tree_adrs: &Adrs,
) -> Vec<u8> {
    let n = hasher.n();
    let mut node = leaf[..n].to_vec();
    let mut buffer = vec![0u8; 2 * n];
    let mut idx = leaf_idx;
    let mut offset = idx_offset;

    for (h, sibling) in auth_path.chunks(n).take(height).enumerate() {
        if idx & 1 == 1 {
            buffer[..n].copy_from_slice(sibling);
            buffer[n..].copy_from_slice(&node);
        } else {
            buffer[..n].copy_from_slice(&node);
            buffer[n..].copy_from_slice(sibling);
        }
        idx >>= 1;
        offset >>= 1;

        let node_adrs = tree_adrs
            .with_tree_height(h as u32 + 1)
            .with_tree_index(idx + offset);
        hasher.thash(&mut node, &buffer, &node_adrs);
    }
    node
}

#[cfg(all(test, feature = "shake"))]
mod tests {
    use super::*;
    use crate::adrs::AdrsType;
    use crate::hash::shake::Shake256Hasher;
    use proptest::prelude::*;

    fn hasher() -> Shake256Hasher {
        Shake256Hasher::new(&[0x24u8; 16])
    }

    fn leaf(i: u32) -> Vec<u8> {
        let mut out = vec![0u8; 16];
        out[..4].copy_from_slice(&i.to_be_bytes());
        out[15] = 0xaa;
        out
    }

    /// Builds the tree level by level, holding every node in memory.
    fn naive_root(
        hasher: &Shake256Hasher,
        adrs: &Adrs,
        idx_offset: u32,
        height: usize,
    ) -> Vec<u8> {
        let mut level: Vec<Vec<u8>> = (0..1u32 << height).map(|i| leaf(i + idx_offset)).collect();
        for h in 0..height {
            let base = idx_offset >> (h + 1);
            level = level
                .chunks(2)
                .enumerate()
                .map(|(i, pair)| {
                    let mut out = vec![0u8; 16];
                    let node_adrs = adrs
                        .with_tree_height(h as u32 + 1)
                        .with_tree_index(base + i as u32);
                    hasher.h(&mut out, &pair[0], &pair[1], &node_adrs);
                    out
                })
                .collect();
        }
        level.remove(0)
    }

    #[test]
    fn test_treehash_matches_naive() {
        let hasher = hasher();
        let adrs = Adrs::new(0, 3).with_type(AdrsType::Tree);
        for height in 0..=5 {
            let root = build_root(&hasher, &adrs, 0, height, leaf);
            assert_eq!(root, naive_root(&hasher, &adrs, 0, height));
        }

        let fors_adrs = Adrs::new(0, 3).with_type(AdrsType::ForsTree).with_keypair(2);
        let offset = 3 << 4;
        let root = build_root(&hasher, &fors_adrs, offset, 4, leaf);
        assert_eq!(root, naive_root(&hasher, &fors_adrs, offset, 4));

        println!("Merkle tree root tests passed.");
    }

    #[test]
    fn test_single_leaf_tree() {
        let hasher = hasher();
        let adrs = Adrs::new(0, 0).with_type(AdrsType::Tree);
        let (root, path) = treehash(&hasher, &adrs, 0, 0, 0, leaf);
        assert_eq!(root, leaf(0));
        assert!(path.is_empty());
        assert_eq!(root_from_path(&hasher, &leaf(0), 0, 0, &path, 0, &adrs), root);
    }

    #[test]
    fn test_wrong_sibling_changes_root() {
        let hasher = hasher();
        let adrs = Adrs::new(1, 0).with_type(AdrsType::Tree);
        let (root, mut path) = treehash(&hasher, &adrs, 5, 0, 3, leaf);
        path[20] ^= 1;
        assert_ne!(root_from_path(&hasher, &leaf(5), 5, 0, &path, 3, &adrs), root);
        assert_ne!(root_from_path(&hasher, &leaf(4), 5, 0, &path, 3, &adrs), root);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_root_from_path_matches_root(
            (height, leaf_idx) in (0usize..=6).prop_flat_map(|h| (Just(h), 0u32..(1u32 << h))),
            tree_number in 0u32..4,
        ) {
            let hasher = hasher();
            let adrs = Adrs::new(0, 1).with_type(AdrsType::ForsTree).with_keypair(7);
            let idx_offset = tree_number << height;
            let (root, path) = treehash(&hasher, &adrs, leaf_idx, idx_offset, height, leaf);
            prop_assert_eq!(path.len(), height * 16);
            prop_assert_eq!(
                &path,
                &auth_path(&hasher, &adrs, leaf_idx, idx_offset, height, leaf)
            );
            prop_assert_eq!(
                &root,
                &build_root(&hasher, &adrs, idx_offset, height, leaf)
            );
            prop_assert_eq!(
                root_from_path(
                    &hasher,
                    &leaf(leaf_idx + idx_offset),
                    leaf_idx,
                    idx_offset,
                    &path,
                    height,
                    &adrs
                ),
                root
            );
        }
    }
}
