use std::fmt;

use crate::bitstream::bitreader::BitReader;

/// Size of the alphabet (one byte per symbol).
pub const MAX_SYMBOLS: usize = 256;
/// Raw bits written for a symbol the tree has not seen yet.
pub const BITS_IN_SYMBOL: usize = 8;
/// Number given to the first node. Every split uses two numbers, and the NYT must still have
/// a number (0) after all 256 symbols have been added.
const ROOT_NUMBER: u16 = 2 * MAX_SYMBOLS as u16;

/// One node of the tree. Links are indices into the tree's node arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Ordering key. Belongs to the position in the tree, not to the subtree sitting there.
    pub number: u16,
    /// Occurrence count. Only the NYT node has weight 0.
    pub weight: u64,
    /// Symbol of a leaf (meaningless on internal nodes and the NYT).
    pub symbol: u8,
    pub parent: Option<usize>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl Node {
    fn new(number: u16, symbol: u8, parent: Option<usize>) -> Self {
        Node {
            number,
            weight: 0,
            symbol,
            parent,
            left: None,
            right: None,
        }
    }
}

/// Adaptive Huffman tree, updated with the FGK algorithm after every symbol.
///
/// Encoder and decoder each keep their own tree and call `update` with every symbol they
/// process, so both trees go through the same states without any frequency table being
/// transmitted. A symbol seen for the first time is sent as the code of the NYT ("not yet
/// transmitted") node followed by its 8 raw bits.
#[derive(Debug, Clone)]
pub struct FgkTree {
    /// Node arena. Nodes are never removed, so indices stay valid for the life of the tree.
    nodes: Vec<Node>,
    root: usize,
    nyt: usize,
    /// Leaf of every symbol seen so far.
    leaves: [Option<usize>; MAX_SYMBOLS],
}

impl FgkTree {
    /// Create a tree holding only the NYT node.
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(2 * MAX_SYMBOLS + 1);
        nodes.push(Node::new(ROOT_NUMBER, 0, None));
        FgkTree {
            nodes,
            root: 0,
            nyt: 0,
            leaves: [None; MAX_SYMBOLS],
        }
    }

    /// Read access to a node (mainly for tests and debugging).
    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// Arena index of the root node.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Arena index of the NYT node.
    pub fn nyt(&self) -> usize {
        self.nyt
    }

    /// Arena index of the leaf holding `symbol`, if the symbol has been seen.
    pub fn leaf(&self, symbol: u8) -> Option<usize> {
        self.leaves[symbol as usize]
    }

    /// Number of nodes in the tree.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return the code for `symbol` in the current tree. Unseen symbols get the NYT code
    /// followed by the symbol's 8 bits, most significant first. Does not change the tree.
    pub fn encode(&self, symbol: u8) -> Vec<bool> {
        match self.leaves[symbol as usize] {
            Some(leaf) => self.node_code(leaf),
            None => {
                let mut code = self.node_code(self.nyt);
                code.extend((0..BITS_IN_SYMBOL).rev().map(|i| (symbol >> i) & 1 == 1));
                code
            }
        }
    }

    /// Decode one symbol from the bit source. Returns None if the bits run out first.
    /// The tree is not changed; call `update` with the result.
    pub fn decode(&self, br: &mut BitReader<'_>) -> Option<u8> {
        let mut idx = self.root;
        while let (Some(left), Some(right)) = (self.nodes[idx].left, self.nodes[idx].right) {
            idx = if br.bool_bit()? { right } else { left };
        }
        if idx == self.nyt {
            br.byte()
        } else {
            Some(self.nodes[idx].symbol)
        }
    }

    /// Account for one more occurrence of `symbol`, restructuring the tree as needed.
    pub fn update(&mut self, symbol: u8) {
        let mut idx = match self.leaves[symbol as usize] {
            Some(leaf) => leaf,
            None => self.split_nyt(symbol),
        };

        while idx != self.root {
            // Move the node to the highest numbered position holding its weight class
            let weight = self.nodes[idx].weight;
            if let Some(succ) = self.find_successor(weight) {
                if succ != idx && Some(succ) != self.nodes[idx].parent {
                    self.swap_nodes(idx, succ);
                }
            }
            self.nodes[idx].weight += 1;
            // The root has no parent, and we stop before reaching it
            idx = match self.nodes[idx].parent {
                Some(parent) => parent,
                None => break,
            };
        }
        self.nodes[self.root].weight += 1;

        debug_assert!(self.sibling_property_holds());
    }

    /// Give the NYT node two children: a new NYT on the left and a new leaf for `symbol` on
    /// the right. Returns the new leaf.
    fn split_nyt(&mut self, symbol: u8) -> usize {
        let old = self.nyt;
        let number = self.nodes[old].number;
        let new_nyt = self.nodes.len();
        let leaf = new_nyt + 1;
        self.nodes.push(Node::new(number - 2, 0, Some(old)));
        self.nodes.push(Node::new(number - 1, symbol, Some(old)));
        self.nodes[old].left = Some(new_nyt);
        self.nodes[old].right = Some(leaf);
        self.nyt = new_nyt;
        self.leaves[symbol as usize] = Some(leaf);
        leaf
    }

    /// Walk up from a node to the root to build its code.
    fn node_code(&self, mut idx: usize) -> Vec<bool> {
        let mut code = Vec::new();
        while let Some(parent) = self.nodes[idx].parent {
            code.push(self.nodes[parent].right == Some(idx));
            idx = parent;
        }
        // We collected the bits leaf first
        code.reverse();
        code
    }

    /// Find the node with the highest number among those with the given weight. Subtrees
    /// that are lighter than `weight` cannot hold a match and are skipped, and a match is not
    /// searched below (its children are numbered lower).
    fn find_successor(&self, weight: u64) -> Option<usize> {
        let mut best: Option<usize> = None;
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.weight == weight {
                if best.map_or(true, |b| self.nodes[b].number < node.number) {
                    best = Some(idx);
                }
            } else if node.weight > weight {
                if let (Some(left), Some(right)) = (node.left, node.right) {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        best
    }

    /// Exchange the positions of two nodes (and the subtrees below them). Node numbers stay
    /// with the positions. Neither node may be the root, nor an ancestor of the other.
    fn swap_nodes(&mut self, a: usize, b: usize) {
        let (a_parent, b_parent) = match (self.nodes[a].parent, self.nodes[b].parent) {
            (Some(a_parent), Some(b_parent)) => (a_parent, b_parent),
            _ => return,
        };
        // First scan, then modify (siblings share a parent)
        let a_is_left = self.nodes[a_parent].left == Some(a);
        let b_is_left = self.nodes[b_parent].left == Some(b);

        if a_is_left {
            self.nodes[a_parent].left = Some(b);
        } else {
            self.nodes[a_parent].right = Some(b);
        }
        if b_is_left {
            self.nodes[b_parent].left = Some(a);
        } else {
            self.nodes[b_parent].right = Some(a);
        }
        self.nodes[a].parent = Some(b_parent);
        self.nodes[b].parent = Some(a_parent);

        let a_number = self.nodes[a].number;
        self.nodes[a].number = self.nodes[b].number;
        self.nodes[b].number = a_number;
    }

    /// Check the sibling property over the whole tree: sorted by number the weights never
    /// decrease, siblings carry consecutive numbers below their parent's, and every internal
    /// node weighs as much as its two children together.
    pub fn sibling_property_holds(&self) -> bool {
        let mut reachable = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            reachable.push(idx);
            let node = &self.nodes[idx];
            match (node.left, node.right) {
                (Some(left), Some(right)) => {
                    let (l, r) = (&self.nodes[left], &self.nodes[right]);
                    if l.parent != Some(idx) || r.parent != Some(idx) {
                        return false;
                    }
                    if l.number + 1 != r.number || r.number >= node.number {
                        return false;
                    }
                    if l.weight + r.weight != node.weight {
                        return false;
                    }
                    stack.push(left);
                    stack.push(right);
                }
                (None, None) => {}
                _ => return false,
            }
        }
        if reachable.len() != self.nodes.len() {
            return false;
        }
        reachable.sort_unstable_by_key(|&idx| self.nodes[idx].number);
        reachable
            .windows(2)
            .all(|w| self.nodes[w[0]].weight <= self.nodes[w[1]].weight)
    }

    fn fmt_node(&self, idx: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number_of = |link: Option<usize>| match link {
            Some(i) => self.nodes[i].number.to_string(),
            None => "NULL".to_string(),
        };
        let node = &self.nodes[idx];
        writeln!(
            f,
            "number: {}, weight: {}, symbol: {}, parent: {}, left: {}, right: {}",
            node.number,
            node.weight,
            node.symbol,
            number_of(node.parent),
            number_of(node.left),
            number_of(node.right)
        )?;
        if let (Some(left), Some(right)) = (node.left, node.right) {
            self.fmt_node(left, f)?;
            self.fmt_node(right, f)?;
        }
        Ok(())
    }
}

impl Default for FgkTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first dump of every node, one per line.
impl fmt::Display for FgkTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bitstream::bitwriter::BitWriter;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn new_tree_test() {
        let tree = FgkTree::new();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), tree.nyt());
        assert_eq!(tree.node(tree.root()).number, 512);
        assert!(tree.sibling_property_holds());
    }

    #[test]
    fn first_symbol_is_raw_test() {
        let tree = FgkTree::new();
        // Empty NYT path, then 'A' = 0b0100_0001
        assert_eq!(
            tree.encode(b'A'),
            vec![false, true, false, false, false, false, false, true]
        );
    }

    #[test]
    fn split_numbers_test() {
        let mut tree = FgkTree::new();
        tree.update(b'a');
        let root = tree.node(tree.root());
        assert_eq!(root.weight, 1);
        let leaf = tree.leaf(b'a').unwrap();
        assert_eq!(tree.node(leaf).number, 511);
        assert_eq!(tree.node(leaf).weight, 1);
        assert_eq!(tree.node(tree.nyt()).number, 510);
        assert_eq!(tree.node(tree.nyt()).weight, 0);
        // NYT on the left, symbol on the right
        assert_eq!(tree.encode(b'a'), vec![true]);
        assert_eq!(tree.encode(b'b').len(), 1 + BITS_IN_SYMBOL);
    }

    #[test]
    fn seen_symbol_code_is_shorter_test() {
        let mut tree = FgkTree::new();
        for &s in b"abracadabra" {
            tree.update(s);
        }
        let fallback = tree.encode(b'z');
        assert_eq!(fallback.len(), tree.encode(b'y').len());
        tree.update(b'z');
        assert!(tree.leaf(b'z').is_some());
        assert!(tree.encode(b'z').len() <= fallback.len());
        // The most frequent symbol gets the shortest code
        let a = tree.encode(b'a').len();
        for &s in b"bcdrz" {
            assert!(a <= tree.encode(s).len());
        }
    }

    #[test]
    fn known_sequence_test() {
        // "aab": a is raw, then a is the right child of the root
        let mut tree = FgkTree::new();
        let mut bits = tree.encode(b'a');
        tree.update(b'a');
        bits.extend(tree.encode(b'a'));
        tree.update(b'a');
        bits.extend(tree.encode(b'b'));
        tree.update(b'b');
        let mut expected = vec![false, true, true, false, false, false, false, true];
        expected.push(true);
        // NYT is the left child of the root, then 'b' = 0b0110_0010
        expected.extend([false, false, true, true, false, false, false, true, false]);
        assert_eq!(bits, expected);
        assert!(tree.sibling_property_holds());
    }

    #[test]
    fn sibling_property_every_update_test() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tree = FgkTree::new();
        for i in 0..5000 {
            // Skewed distribution so the tree keeps reshaping
            let symbol = if i % 3 == 0 {
                rng.gen::<u8>()
            } else {
                rng.gen_range(0..8)
            };
            tree.update(symbol);
            assert!(tree.sibling_property_holds(), "after update {}", i);
        }
        assert_eq!(tree.node(tree.root()).weight, 5000);
    }

    #[test]
    fn full_alphabet_keeps_nyt_test() {
        let mut tree = FgkTree::new();
        for s in 0..=255_u8 {
            tree.update(s);
        }
        assert_eq!(tree.len(), 2 * MAX_SYMBOLS + 1);
        assert_eq!(tree.node(tree.nyt()).number, 0);
        assert_eq!(tree.node(tree.nyt()).weight, 0);
        assert!(tree.sibling_property_holds());
        for s in 0..=255_u8 {
            assert!(tree.leaf(s).is_some());
        }
    }

    #[test]
    fn encode_decode_test() {
        let input = b"she sells sea shells by the sea shore";
        let mut encoder = FgkTree::new();
        let mut bw = BitWriter::new(64);
        for &s in input {
            bw.out_bits(&encoder.encode(s));
            encoder.update(s);
        }
        let bytes = bw.into_bytes();

        let mut decoder = FgkTree::new();
        let mut br = BitReader::new(&bytes);
        let mut out = Vec::new();
        for _ in 0..input.len() {
            let s = decoder.decode(&mut br).unwrap();
            decoder.update(s);
            out.push(s);
        }
        assert_eq!(out, input);
    }

    #[test]
    fn decode_out_of_bits_test() {
        let tree = FgkTree::new();
        // The NYT root needs 8 raw bits and there are none
        let mut br = BitReader::new(&[]);
        assert_eq!(tree.decode(&mut br), None);

        let mut tree = FgkTree::new();
        tree.update(b'x');
        let mut br = BitReader::new(&[]);
        assert_eq!(tree.decode(&mut br), None);
    }

    #[test]
    fn display_test() {
        let mut tree = FgkTree::new();
        tree.update(b'a');
        let dump = tree.to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "number: 512, weight: 1, symbol: 0, parent: NULL, left: 510, right: 511"
        );
        assert_eq!(
            lines[2],
            "number: 511, weight: 1, symbol: 97, parent: 512, left: NULL, right: NULL"
        );
    }
}
