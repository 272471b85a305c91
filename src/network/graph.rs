//! Road network: segments plus a symmetric adjacency relation.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use super::segment::{Danger, Segment, SegmentSpec, SpeedDomain};
use crate::error::{ConfigResult, ConfigurationError};

/// Default hard ceiling for dangerous segments.
pub const DEFAULT_SAFETY_CEILING: u32 = 50;

/// How segments are connected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Adjacency {
    /// Segment `i` is adjacent to segment `i + 1`.
    #[default]
    Chain,
    /// Explicit `id -> [adjacent ids]` map. Listing a pair in one
    /// direction is enough; the relation is made symmetric.
    Explicit(BTreeMap<String, Vec<String>>),
}

/// A validated road network.
///
/// Segment order is the order of the input descriptors. Adjacent pairs are
/// stored once as `(i, j)` with `i < j`, in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    segments: Vec<Segment>,
    pairs: Vec<(usize, usize)>,
    index: HashMap<String, usize>,
}

impl Network {
    /// Starts a builder with the default domain, chain adjacency and
    /// safety ceiling.
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    /// Linear-chain network of soft-limited segments named `Seg_0`, `Seg_1`, ...
    ///
    /// # Examples
    ///
    /// ```
    /// use u_speedplan::network::{Network, SpeedDomain};
    ///
    /// let net = Network::from_limits(&[50, 50, 90, 130], SpeedDomain::default()).unwrap();
    /// assert_eq!(net.len(), 4);
    /// assert_eq!(net.adjacent_pairs(), &[(0, 1), (1, 2), (2, 3)]);
    /// ```
    pub fn from_limits(limits: &[u32], domain: SpeedDomain) -> ConfigResult<Self> {
        limits
            .iter()
            .enumerate()
            .fold(Self::builder().domain(domain), |b, (i, &limit)| {
                b.segment(SegmentSpec::limited(format!("Seg_{i}"), limit))
            })
            .build()
    }

    /// Segments in input order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment at `index`.
    pub fn segment(&self, index: usize) -> &Segment {
        &self.segments[index]
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a built network.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Index of the segment named `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Adjacent pairs `(i, j)` with `i < j`, ascending.
    pub fn adjacent_pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Segments adjacent to `index`, ascending.
    pub fn neighbors(&self, index: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .pairs
            .iter()
            .filter_map(|&(a, b)| {
                if a == index {
                    Some(b)
                } else if b == index {
                    Some(a)
                } else {
                    None
                }
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Sum of every segment's domain maximum.
    pub fn max_aggregate_speed(&self) -> u64 {
        self.segments
            .iter()
            .map(|s| u64::from(s.domain().max().unwrap_or(0)))
            .sum()
    }
}

/// Builder for [`Network`].
///
/// # Examples
///
/// ```
/// use u_speedplan::network::{Network, SegmentSpec};
///
/// let net = Network::builder()
///     .segment(SegmentSpec::limited("A", 90))
///     .segment(SegmentSpec::dangerous("B"))
///     .build()
///     .unwrap();
/// assert_eq!(net.segment(1).limit(), 50);
/// ```
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    specs: Vec<SegmentSpec>,
    domain: SpeedDomain,
    adjacency: Adjacency,
    safety_ceiling: u32,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkBuilder {
    /// Creates a builder with the default settings.
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            domain: SpeedDomain::default(),
            adjacency: Adjacency::Chain,
            safety_ceiling: DEFAULT_SAFETY_CEILING,
        }
    }

    /// Shared domain for segments without an override.
    pub fn domain(mut self, domain: SpeedDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Adds one segment descriptor.
    pub fn segment(mut self, spec: SegmentSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Adds several segment descriptors in order.
    pub fn segments(mut self, specs: impl IntoIterator<Item = SegmentSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Sets the adjacency relation.
    pub fn adjacency(mut self, adjacency: Adjacency) -> Self {
        self.adjacency = adjacency;
        self
    }

    /// Hard limit applied to dangerous segments.
    pub fn safety_ceiling(mut self, ceiling: u32) -> Self {
        self.safety_ceiling = ceiling;
        self
    }

    /// Validates the descriptors and builds the network.
    pub fn build(self) -> ConfigResult<Network> {
        if self.specs.is_empty() {
            return Err(ConfigurationError::EmptyNetwork);
        }

        let mut index = HashMap::with_capacity(self.specs.len());
        let mut segments = Vec::with_capacity(self.specs.len());

        for (i, spec) in self.specs.into_iter().enumerate() {
            if index.insert(spec.id.clone(), i).is_some() {
                return Err(ConfigurationError::DuplicateSegment { id: spec.id });
            }
            let domain = spec.domain.unwrap_or_else(|| self.domain.clone());
            let Some(domain_max) = domain.max() else {
                return Err(ConfigurationError::EmptyDomain { segment: spec.id });
            };
            let (danger, limit) = match (spec.dangerous, spec.legal_limit) {
                (true, Some(legal)) => (Danger::Hard, legal.min(self.safety_ceiling)),
                (true, None) => (Danger::Hard, self.safety_ceiling),
                (false, Some(legal)) => (Danger::Soft, legal),
                (false, None) => (Danger::None, domain_max),
            };
            segments.push(Segment::new(spec.id, domain, danger, limit, spec.legal_limit));
        }

        let pairs = match &self.adjacency {
            Adjacency::Chain => (1..segments.len()).map(|i| (i - 1, i)).collect(),
            Adjacency::Explicit(map) => explicit_pairs(map, &index)?,
        };

        debug!(
            "built network: {} segments, {} adjacent pairs",
            segments.len(),
            pairs.len()
        );

        Ok(Network {
            segments,
            pairs,
            index,
        })
    }
}

fn explicit_pairs(
    map: &BTreeMap<String, Vec<String>>,
    index: &HashMap<String, usize>,
) -> ConfigResult<Vec<(usize, usize)>> {
    let lookup = |id: &String| {
        index
            .get(id)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownSegment { id: id.clone() })
    };

    let mut pairs = BTreeSet::new();
    for (from, neighbors) in map {
        let a = lookup(from)?;
        for to in neighbors {
            let b = lookup(to)?;
            if a == b {
                return Err(ConfigurationError::SelfAdjacency { id: from.clone() });
            }
            pairs.insert((a.min(b), a.max(b)));
        }
    }
    Ok(pairs.into_iter().collect())
}
