//! One virtual parameter vector over several parameter objects.

use curve_core::traits::ParameterObject;
use curve_core::types::ParameterError;
use std::collections::HashMap;
use std::hash::Hash;

/// Ordered view over a set of keyed parameter objects.
///
/// The aggregated parameter is the concatenation of the members' parameters
/// in insertion order; members without parameters contribute nothing. The
/// view is transient: it never clones itself for a parameter
/// ([`ParameterError::CloneUnsupported`]). To move to a new parameter vector,
/// ask for [`objects_to_modify_for_parameter`](Self::objects_to_modify_for_parameter)
/// and clone the owners of the members.
///
/// # Example
///
/// ```
/// use curve_core::market_data::{Curve, DiscountCurve};
/// use curve_core::traits::ParameterObject;
/// use curve_optimiser::calibration::ParameterAggregation;
///
/// let curve = |name: &str, df: f64| -> Curve {
///     DiscountCurve::builder(name)
///         .add_point(0.0, 1.0, false)
///         .add_point(1.0, df, true)
///         .build()
///         .unwrap()
///         .into()
/// };
///
/// let mut aggregation = ParameterAggregation::new();
/// aggregation.add("EUR", curve("discount-EUR", 0.98));
/// aggregation.add("USD", curve("discount-USD", 0.96));
/// assert_eq!(aggregation.parameter(), Some(vec![0.98, 0.96]));
///
/// let changes = aggregation.objects_to_modify_for_parameter(&[0.97, 0.95]).unwrap();
/// assert_eq!(changes["EUR"], vec![0.97]);
/// assert_eq!(changes["USD"], vec![0.95]);
/// ```
#[derive(Debug, Clone)]
pub struct ParameterAggregation<K, P> {
    members: Vec<(K, P)>,
}

impl<K, P> Default for ParameterAggregation<K, P> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<K, P> ParameterAggregation<K, P>
where
    K: Eq + Hash + Clone,
    P: ParameterObject,
{
    /// Create an empty aggregation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregation from keyed members, added in order.
    pub fn from_members<I>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
    {
        let mut aggregation = Self::new();
        for (key, member) in members {
            aggregation.add(key, member);
        }
        aggregation
    }

    /// Add `member` under `key`.
    ///
    /// A member already stored under `key` is replaced in place and returned;
    /// otherwise the member is appended.
    pub fn add(&mut self, key: K, member: P) -> Option<P> {
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.members[i].1, member)),
            None => {
                self.members.push((key, member));
                None
            }
        }
    }

    /// Remove and return the member stored under `key`.
    pub fn remove(&mut self, key: &K) -> Option<P> {
        self.position(key).map(|i| self.members.remove(i).1)
    }

    /// Whether a member is stored under `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Member stored under `key`.
    pub fn get(&self, key: &K) -> Option<&P> {
        self.position(key).map(|i| &self.members[i].1)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether there are no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.members.iter().map(|(k, _)| k)
    }

    /// Keyed members in insertion order.
    pub fn members(&self) -> impl Iterator<Item = (&K, &P)> {
        self.members.iter().map(|(k, p)| (k, p))
    }

    /// Replace every member with parameters by its clone for the matching
    /// slice of `parameter`.
    ///
    /// Members are replaced in this view only; the objects they were cloned
    /// from are untouched. On error the view is left unchanged.
    ///
    /// # Errors
    ///
    /// [`ParameterError::DimensionMismatch`] if `parameter` does not have
    /// [`parameter_len`](ParameterObject::parameter_len) entries, or any error
    /// of a member's clone.
    pub fn set_parameter(&mut self, parameter: &[f64]) -> Result<(), ParameterError> {
        let mut clones = Vec::with_capacity(self.members.len());
        for (i, slice) in self.slices(parameter)? {
            clones.push((i, self.members[i].1.clone_for_parameter(slice)?));
        }
        for (i, clone) in clones {
            self.members[i].1 = clone;
        }
        Ok(())
    }

    /// Per-member parameter vectors for the aggregated `parameter`.
    ///
    /// Every member with parameters appears under its key with its own
    /// sub-range of `parameter`. Members without parameters are omitted.
    ///
    /// # Errors
    ///
    /// [`ParameterError::DimensionMismatch`] if `parameter` has the wrong
    /// length.
    pub fn objects_to_modify_for_parameter(
        &self,
        parameter: &[f64],
    ) -> Result<HashMap<K, Vec<f64>>, ParameterError> {
        Ok(self
            .slices(parameter)?
            .into_iter()
            .map(|(i, slice)| (self.members[i].0.clone(), slice.to_vec()))
            .collect())
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.members.iter().position(|(k, _)| k == key)
    }

    /// Split `parameter` into (member index, slice) for members with parameters.
    fn slices<'p>(&self, parameter: &'p [f64]) -> Result<Vec<(usize, &'p [f64])>, ParameterError> {
        let lengths: Vec<usize> = self.members.iter().map(|(_, p)| p.parameter_len()).collect();
        let expected: usize = lengths.iter().sum();
        if parameter.len() != expected {
            return Err(ParameterError::dimension_mismatch(expected, parameter.len()));
        }

        let mut offset = 0;
        let mut slices = Vec::new();
        for (i, len) in lengths.into_iter().enumerate() {
            if len > 0 {
                slices.push((i, &parameter[offset..offset + len]));
                offset += len;
            }
        }
        Ok(slices)
    }
}

impl<K, P> ParameterObject for ParameterAggregation<K, P>
where
    K: Eq + Hash + Clone,
    P: ParameterObject,
{
    fn parameter(&self) -> Option<Vec<f64>> {
        let parameter: Vec<f64> = self
            .members
            .iter()
            .filter_map(|(_, p)| p.parameter())
            .flatten()
            .collect();
        (!parameter.is_empty()).then_some(parameter)
    }

    fn parameter_len(&self) -> usize {
        self.members.iter().map(|(_, p)| p.parameter_len()).sum()
    }

    fn clone_for_parameter(&self, _parameter: &[f64]) -> Result<Self, ParameterError> {
        Err(ParameterError::clone_unsupported("ParameterAggregation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Block(Vec<f64>);

    impl ParameterObject for Block {
        fn parameter(&self) -> Option<Vec<f64>> {
            (!self.0.is_empty()).then(|| self.0.clone())
        }

        fn clone_for_parameter(&self, parameter: &[f64]) -> Result<Self, ParameterError> {
            if parameter.len() != self.0.len() {
                return Err(ParameterError::dimension_mismatch(self.0.len(), parameter.len()));
            }
            Ok(Block(parameter.to_vec()))
        }
    }

    fn aggregation() -> ParameterAggregation<&'static str, Block> {
        ParameterAggregation::from_members([
            ("a", Block(vec![1.0, 2.0])),
            ("empty", Block(vec![])),
            ("b", Block(vec![3.0])),
        ])
    }

    // ========================================
    // Membership Tests
    // ========================================

    #[test]
    fn test_add_replaces_in_place() {
        let mut agg = aggregation();
        let old = agg.add("a", Block(vec![9.0]));
        assert_eq!(old, Some(Block(vec![1.0, 2.0])));
        assert_eq!(agg.keys().copied().collect::<Vec<_>>(), vec!["a", "empty", "b"]);
        assert_eq!(agg.parameter(), Some(vec![9.0, 3.0]));
    }

    #[test]
    fn test_remove_and_contains() {
        let mut agg = aggregation();
        assert!(agg.contains(&"b"));
        assert_eq!(agg.remove(&"b"), Some(Block(vec![3.0])));
        assert!(!agg.contains(&"b"));
        assert_eq!(agg.remove(&"b"), None);
        assert_eq!(agg.len(), 2);
    }

    #[test]
    fn test_empty_has_no_parameter() {
        let agg: ParameterAggregation<&str, Block> = ParameterAggregation::new();
        assert!(agg.is_empty());
        assert_eq!(agg.parameter(), None);
        assert_eq!(agg.parameter_len(), 0);

        let only_empty = ParameterAggregation::from_members([("x", Block(vec![]))]);
        assert_eq!(only_empty.parameter(), None);
    }

    // ========================================
    // Parameter Tests
    // ========================================

    #[test]
    fn test_objects_to_modify_skips_members_without_parameters() {
        let agg = aggregation();
        let changes = agg.objects_to_modify_for_parameter(&[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes["a"], vec![4.0, 5.0]);
        assert_eq!(changes["b"], vec![6.0]);
        // the view itself is untouched
        assert_eq!(agg.parameter(), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_objects_to_modify_wrong_length() {
        let err = aggregation()
            .objects_to_modify_for_parameter(&[1.0])
            .unwrap_err();
        assert_eq!(err, ParameterError::dimension_mismatch(3, 1));
    }

    #[test]
    fn test_set_parameter_replaces_members() {
        let original = Block(vec![1.0, 2.0]);
        let mut agg = ParameterAggregation::from_members([("a", original.clone())]);
        agg.set_parameter(&[7.0, 8.0]).unwrap();
        assert_eq!(agg.get(&"a"), Some(&Block(vec![7.0, 8.0])));
        assert_eq!(original, Block(vec![1.0, 2.0]));
    }

    #[test]
    fn test_set_parameter_wrong_length_leaves_view() {
        let mut agg = aggregation();
        assert!(agg.set_parameter(&[1.0, 2.0]).is_err());
        assert_eq!(agg.parameter(), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_clone_for_parameter_unsupported() {
        let err = aggregation().clone_for_parameter(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(err.is_clone_unsupported());
    }

    // ========================================
    // Property Tests
    // ========================================

    fn blocks() -> impl Strategy<Value = Vec<Vec<f64>>> {
        prop::collection::vec(prop::collection::vec(-1e3..1e3f64, 0..5), 0..6)
    }

    proptest! {
        #[test]
        fn prop_length_is_sum_of_members(blocks in blocks()) {
            let agg = ParameterAggregation::from_members(
                blocks.iter().cloned().enumerate().map(|(i, b)| (i, Block(b))),
            );
            let total: usize = blocks.iter().map(Vec::len).sum();
            prop_assert_eq!(agg.parameter_len(), total);
            prop_assert_eq!(agg.parameter().map_or(0, |p| p.len()), total);
        }

        #[test]
        fn prop_round_trip_returns_member_vectors(blocks in blocks()) {
            let agg = ParameterAggregation::from_members(
                blocks.iter().cloned().enumerate().map(|(i, b)| (i, Block(b))),
            );
            let parameter = agg.parameter().unwrap_or_default();
            let changes = agg.objects_to_modify_for_parameter(&parameter).unwrap();
            for (i, block) in blocks.iter().enumerate() {
                if block.is_empty() {
                    prop_assert!(!changes.contains_key(&i));
                } else {
                    prop_assert_eq!(&changes[&i], block);
                }
            }
        }
    }
}
