use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::branch_point::BranchPoint;
use crate::codec::{Digit, TimeSlotCodec, RADIX};
use crate::config::TrieConfig;
use crate::digest::{DigestFunction, Murmur3};
use crate::error::{Error, Result};
use crate::record::{Record, TimestampMillis};

type NodeIndex = usize;

const ROOT: NodeIndex = 0;

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Node {
    /// XOR of the digests of every record whose path runs through this node.
    aggregate: u32,
    children: [Option<NodeIndex>; RADIX],
}

/// Time-partitioned digest trie.
///
/// Each inserted record XORs its digest into the root and into every node along the digit
/// path of its time slot, so the node at prefix `p` summarizes every record whose slot path
/// starts with `p`. Nodes live in an arena owned by the trie; `nodes[0]` is the root and a
/// node is only ever referenced by its parent.
///
/// The trie has no internal synchronization. Share it across threads behind a lock, or
/// compare against a cloned snapshot.
///
/// With the `serde` feature a trie serializes as its configuration, digest and arena. The
/// codec is rebuilt from the configuration on the way back in, and a snapshot whose arena is
/// not a single tree rooted at node 0 is rejected with [`Error::Decode`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "RawDigestTrie<D>",
        bound(deserialize = "D: DigestFunction + Deserialize<'de>")
    )
)]
pub struct DigestTrie<D = Murmur3> {
    config: TrieConfig,
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    codec: TimeSlotCodec,
    digest: D,
    nodes: Vec<Node>,
}

/// Wire shape of a trie snapshot, checked before it becomes a [`DigestTrie`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawDigestTrie<D> {
    config: TrieConfig,
    digest: D,
    nodes: Vec<Node>,
}

#[cfg(feature = "serde")]
impl<D> TryFrom<RawDigestTrie<D>> for DigestTrie<D>
where
    D: DigestFunction,
{
    type Error = Error;

    fn try_from(raw: RawDigestTrie<D>) -> Result<Self> {
        let mut trie = Self::with_digest(raw.config, raw.digest)?;
        check_arena(&raw.nodes, trie.codec.width())?;
        trie.nodes = raw.nodes;
        Ok(trie)
    }
}

/// Checks that `nodes` forms one tree rooted at node 0.
///
/// Every child index must be in range and claimed by exactly one parent, the root by none,
/// and every node must be reachable from the root. With padded paths, leaves must sit at the
/// full path depth and each interior aggregate must equal the XOR of its children.
#[cfg(feature = "serde")]
fn check_arena(nodes: &[Node], width: Option<usize>) -> Result<()> {
    if nodes.is_empty() {
        return Err(Error::Decode("trie snapshot has no root node".into()));
    }

    let mut claimed = vec![false; nodes.len()];
    claimed[ROOT] = true;
    for (index, node) in nodes.iter().enumerate() {
        for &child in node.children.iter().flatten() {
            let Some(slot) = claimed.get_mut(child) else {
                return Err(Error::Decode(format!(
                    "node {index} points at missing node {child}"
                )));
            };
            if *slot {
                return Err(Error::Decode(format!(
                    "node {child} is claimed by more than one parent"
                )));
            }
            *slot = true;
        }
    }

    // Parents are unique, so the walk below visits each reachable node once.
    let mut visited = 0;
    let mut stack = vec![(ROOT, 0usize)];
    while let Some((index, depth)) = stack.pop() {
        visited += 1;
        let node = &nodes[index];
        let mut children = node.children.iter().flatten().peekable();

        if let Some(width) = width {
            if children.peek().is_none() {
                let complete = depth == width || (index == ROOT && node.aggregate == 0);
                if !complete {
                    return Err(Error::Decode(format!(
                        "leaf node {index} sits at depth {depth}, expected {width}"
                    )));
                }
            } else {
                let folded = node
                    .children
                    .iter()
                    .flatten()
                    .fold(0, |acc, &child| acc ^ nodes[child].aggregate);
                if folded != node.aggregate {
                    return Err(Error::Decode(format!(
                        "node {index} aggregate does not match its children"
                    )));
                }
            }
        }

        stack.extend(children.map(|&child| (child, depth + 1)));
    }

    if visited != nodes.len() {
        return Err(Error::Decode(format!(
            "{} nodes are unreachable from the root",
            nodes.len() - visited
        )));
    }
    Ok(())
}

impl DigestTrie<Murmur3> {
    /// Empty trie digesting identifiers with MurmurHash3 seeded from `config.seed`.
    pub fn new(config: TrieConfig) -> Result<Self> {
        let digest = Murmur3::with_seed(config.seed);
        Self::with_digest(config, digest)
    }
}

impl<D> DigestTrie<D>
where
    D: DigestFunction,
{
    /// Empty trie digesting identifiers with `digest`.
    ///
    /// A seeded digest must carry the seed named in `config`; otherwise two tries with equal
    /// configurations could still hash identifiers differently.
    pub fn with_digest(config: TrieConfig, digest: D) -> Result<Self> {
        let codec = TimeSlotCodec::from_config(&config)?;
        if let Some(seed) = digest.seed() {
            if seed != config.seed {
                return Err(Error::Config(format!(
                    "digest seed {seed} does not match configured seed {}",
                    config.seed
                )));
            }
        }
        Ok(Self {
            config,
            codec,
            digest,
            nodes: vec![Node::default()],
        })
    }

    /// Fold a record into the trie.
    ///
    /// Empty identifiers are rejected. The path is resolved before any aggregate is touched,
    /// so a failed insert leaves the trie as it was. Inserting the same `(id, timestamp)` pair
    /// twice cancels out, since XOR is its own inverse.
    pub fn insert(&mut self, id: &str, timestamp: TimestampMillis) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidArgument("record id must not be empty".into()));
        }
        let path = self.codec.to_digits(timestamp)?;
        let digest = self.digest.digest(id.as_bytes())?;

        let allocated = self.fold(&path, digest);
        tracing::trace!(id, timestamp, digest, allocated, "record folded into trie");
        Ok(())
    }

    pub fn insert_record(&mut self, record: &Record) -> Result<()> {
        self.insert(&record.id, record.timestamp)
    }

    /// Insert records in order, stopping at the first failure.
    pub fn extend<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .try_for_each(|record| self.insert_record(record))
    }

    #[cfg(feature = "chrono")]
    pub fn insert_at(&mut self, id: &str, at: chrono::DateTime<chrono::Utc>) -> Result<()> {
        let timestamp = TimestampMillis::try_from(at.timestamp_millis()).map_err(|_| {
            Error::InvalidArgument(format!("{at:?} is before the Unix epoch"))
        })?;
        self.insert(id, timestamp)
    }

    /// Earliest slot at which this trie and `other` disagree.
    pub fn branch_point(&self, other: &Self) -> Result<BranchPoint> {
        crate::branch_point::branch_point(self, other)
    }

    /// XOR `digest` into the root and every node on `path`; returns how many nodes were created.
    fn fold(&mut self, path: &[Digit], digest: u32) -> usize {
        let before = self.nodes.len();
        self.nodes[ROOT].aggregate ^= digest;

        let mut current = ROOT;
        for &digit in path {
            let slot = digit as usize;
            let child = match self.nodes[current].children[slot] {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[current].children[slot] = Some(child);
                    child
                }
            };
            self.nodes[child].aggregate ^= digest;
            current = child;
        }

        self.nodes.len() - before
    }
}

impl<D> DigestTrie<D> {
    pub fn config(&self) -> &TrieConfig {
        &self.config
    }

    pub fn codec(&self) -> &TimeSlotCodec {
        &self.codec
    }

    /// XOR of every inserted record's digest.
    pub fn aggregate(&self) -> u32 {
        self.nodes[ROOT].aggregate
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            nodes: &self.nodes,
            index: ROOT,
        }
    }

    /// Node reached from the root by `prefix`, if any record's path passed through it.
    pub fn node(&self, prefix: &[Digit]) -> Option<NodeRef<'_>> {
        prefix
            .iter()
            .try_fold(self.root(), |node, &digit| node.child(digit))
    }

    /// Number of allocated nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True until the first insert (or after `clear`).
    pub fn is_empty(&self) -> bool {
        self.root().is_leaf()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::default());
    }
}

/// Structural equality: same configuration, same shape, same aggregates.
///
/// Arena layout depends on insertion order and is ignored.
impl<D> PartialEq for DigestTrie<D> {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config && self.root() == other.root()
    }
}

impl<D> Eq for DigestTrie<D> {}

/// Borrowed view of one trie node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    nodes: &'a [Node],
    index: NodeIndex,
}

impl<'a> NodeRef<'a> {
    pub fn aggregate(&self) -> u32 {
        self.nodes[self.index].aggregate
    }

    pub fn child(&self, digit: Digit) -> Option<NodeRef<'a>> {
        let index = (*self.nodes[self.index].children.get(digit as usize)?)?;
        Some(NodeRef {
            nodes: self.nodes,
            index,
        })
    }

    /// Existing children in ascending digit order.
    pub fn children(&self) -> impl Iterator<Item = (Digit, NodeRef<'a>)> + 'a {
        let nodes = self.nodes;
        let node: &'a Node = &nodes[self.index];
        node.children
            .iter()
            .enumerate()
            .filter_map(move |(digit, child)| {
                child.map(|index| (digit as Digit, NodeRef { nodes, index }))
            })
    }

    pub fn is_leaf(&self) -> bool {
        self.nodes[self.index].children.iter().all(Option::is_none)
    }

    /// Digits taken by always descending into the smallest existing child until a leaf.
    ///
    /// The result spells the earliest slot suffix recorded below this node; it is empty when
    /// the node has no children.
    pub fn min_path(&self) -> Vec<Digit> {
        let mut path = Vec::new();
        let mut node = *self;
        while let Some((digit, child)) = node.children().next() {
            path.push(digit);
            node = child;
        }
        path
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.aggregate() == other.aggregate()
            && (0..RADIX as Digit).all(|digit| self.child(digit) == other.child(digit))
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("aggregate", &self.aggregate())
            .field(
                "children",
                &self.children().map(|(digit, _)| digit).collect::<Vec<_>>(),
            )
            .finish()
    }
}
