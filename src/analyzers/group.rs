//! Partitioning observations by region and by arbitrary keys.

use crate::error::MetricsError;
use crate::model::{Observation, Region, RegionId};
use std::collections::{BTreeMap, HashMap};

/// All observations for one region, in input order.
#[derive(Debug)]
pub struct RegionGroup<'a> {
    pub id: RegionId,
    /// Descriptor of the region's first observation.
    pub region: &'a Region,
    pub observations: Vec<&'a Observation>,
}

/// Groups observations by region identity.
///
/// Groups come out in first-seen order; within a group, observations keep
/// their relative input order.
///
/// # Errors
///
/// Returns [`MetricsError::MalformedRecord`] if any observation's region has
/// no usable id.
pub fn group_by_region(observations: &[Observation]) -> Result<Vec<RegionGroup<'_>>, MetricsError> {
    let mut index: HashMap<RegionId, usize> = HashMap::new();
    let mut groups: Vec<RegionGroup<'_>> = Vec::new();

    for obs in observations {
        let id = obs.region.id()?;
        let slot = *index.entry(id.clone()).or_insert_with(|| {
            groups.push(RegionGroup {
                id,
                region: &obs.region,
                observations: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].observations.push(obs);
    }

    Ok(groups)
}

/// Groups observations by the key `key_of` derives from each one.
///
/// # Errors
///
/// Propagates the first error returned by `key_of`.
pub fn group_by_key<'a, K, I, F>(
    observations: I,
    key_of: F,
) -> Result<BTreeMap<K, Vec<&'a Observation>>, MetricsError>
where
    K: Ord,
    I: IntoIterator<Item = &'a Observation>,
    F: Fn(&Observation) -> Result<K, MetricsError>,
{
    let mut groups: BTreeMap<K, Vec<&'a Observation>> = BTreeMap::new();
    for obs in observations {
        groups.entry(key_of(obs)?).or_default().push(obs);
    }
    Ok(groups)
}

/// Groups observations by their calendar day string.
pub fn group_by_date(
    observations: &[Observation],
) -> Result<BTreeMap<String, Vec<&Observation>>, MetricsError> {
    group_by_key(observations, |obs| Ok(obs.date.clone()))
}
