//! Segment and speed-domain types.

use crate::error::{ConfigResult, ConfigurationError};

/// A finite, ascending set of permissible speed values.
///
/// Values are positive, sorted and free of duplicates.
///
/// # Examples
///
/// ```
/// use u_speedplan::network::SpeedDomain;
///
/// let domain = SpeedDomain::stepped(10, 130, 10).unwrap();
/// assert_eq!(domain.len(), 13);
/// assert_eq!(domain.max(), Some(130));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<u32>", into = "Vec<u32>"))]
pub struct SpeedDomain {
    values: Vec<u32>,
}

impl SpeedDomain {
    /// Creates a domain from arbitrary values. Sorts and deduplicates them.
    pub fn new(values: impl IntoIterator<Item = u32>) -> ConfigResult<Self> {
        let mut values: Vec<u32> = values.into_iter().collect();
        if let Some(&zero) = values.iter().find(|&&v| v == 0) {
            return Err(ConfigurationError::InvalidDomainValue { value: zero });
        }
        values.sort_unstable();
        values.dedup();
        Ok(Self { values })
    }

    /// Every multiple of `step` starting at `min` up to and including `max`.
    pub fn stepped(min: u32, max: u32, step: u32) -> ConfigResult<Self> {
        if step == 0 {
            return Err(ConfigurationError::InvalidParameter(
                "domain step must be positive".into(),
            ));
        }
        if min > max {
            return Err(ConfigurationError::InvalidParameter(format!(
                "domain min {min} exceeds max {max}"
            )));
        }
        Self::new((min..=max).step_by(step as usize))
    }

    /// Values in ascending order.
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the domain has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest value.
    pub fn min(&self) -> Option<u32> {
        self.values.first().copied()
    }

    /// Largest value.
    pub fn max(&self) -> Option<u32> {
        self.values.last().copied()
    }

    /// True when `value` is in the domain.
    pub fn contains(&self, value: u32) -> bool {
        self.values.binary_search(&value).is_ok()
    }
}

impl TryFrom<Vec<u32>> for SpeedDomain {
    type Error = ConfigurationError;

    fn try_from(values: Vec<u32>) -> ConfigResult<Self> {
        Self::new(values)
    }
}

impl From<SpeedDomain> for Vec<u32> {
    fn from(domain: SpeedDomain) -> Self {
        domain.values
    }
}

impl Default for SpeedDomain {
    /// Multiples of 10 from 10 to 130.
    fn default() -> Self {
        Self {
            values: (1..=13).map(|k| k * 10).collect(),
        }
    }
}

/// Danger classification of a segment.
///
/// Selects the cost curve of the segment's limit constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Danger {
    /// No limit information. The limit equals the domain maximum.
    None,
    /// Exceeding the limit costs a finite, growing penalty.
    Soft,
    /// Exceeding the limit is a hard cutoff.
    Hard,
}

impl Danger {
    /// True for a hard cutoff.
    pub fn is_hard(self) -> bool {
        matches!(self, Danger::Hard)
    }
}

/// Input descriptor for one segment.
///
/// Resolved into a [`Segment`] by the
/// [`NetworkBuilder`](crate::network::NetworkBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentSpec {
    /// Unique segment identifier.
    pub id: String,
    /// Posted legal limit, if known.
    pub legal_limit: Option<u32>,
    /// Whether the segment is flagged dangerous.
    pub dangerous: bool,
    /// Domain override. `None` uses the network's shared domain.
    pub domain: Option<SpeedDomain>,
}

impl SegmentSpec {
    /// A segment soft-limited at its legal limit.
    pub fn limited(id: impl Into<String>, limit: u32) -> Self {
        Self {
            id: id.into(),
            legal_limit: Some(limit),
            dangerous: false,
            domain: None,
        }
    }

    /// A dangerous segment, hard-limited at the network's safety ceiling.
    pub fn dangerous(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            legal_limit: None,
            dangerous: true,
            domain: None,
        }
    }

    /// A dangerous segment with a posted limit.
    ///
    /// The effective hard limit is the lower of the legal limit and the
    /// safety ceiling.
    pub fn dangerous_with_limit(id: impl Into<String>, limit: u32) -> Self {
        Self {
            id: id.into(),
            legal_limit: Some(limit),
            dangerous: true,
            domain: None,
        }
    }

    /// A segment with no limit information.
    pub fn unrestricted(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            legal_limit: None,
            dangerous: false,
            domain: None,
        }
    }

    /// Overrides the shared domain for this segment.
    pub fn with_domain(mut self, domain: SpeedDomain) -> Self {
        self.domain = Some(domain);
        self
    }
}

/// One road stretch: a single optimization variable.
///
/// Immutable once the network is built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    id: String,
    domain: SpeedDomain,
    danger: Danger,
    limit: u32,
    legal_limit: Option<u32>,
}

impl Segment {
    pub(crate) fn new(
        id: String,
        domain: SpeedDomain,
        danger: Danger,
        limit: u32,
        legal_limit: Option<u32>,
    ) -> Self {
        Self {
            id,
            domain,
            danger,
            limit,
            legal_limit,
        }
    }

    /// Segment name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Permissible speeds.
    pub fn domain(&self) -> &SpeedDomain {
        &self.domain
    }

    /// Danger classification.
    pub fn danger(&self) -> Danger {
        self.danger
    }

    /// Effective limit used by the limit constraint.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Posted limit as supplied by the caller.
    pub fn legal_limit(&self) -> Option<u32> {
        self.legal_limit
    }
}
