//! Median aggregation.
//!
//! The feed answer is the middle element of the ascending sort of the
//! report's observations. With `2f + 1` observations the median sits at
//! index `f`, so up to `f` arbitrarily wrong observations on either side
//! cannot move it outside the range of honest values.

use ocr_types::Observation;

/// Median of `observations`, selected without interpolation.
///
/// For an even count the upper of the two middle elements is returned.
/// Returns `None` for an empty slice.
///
/// # Examples
///
/// ```
/// use ocr_feed::median::median;
///
/// assert_eq!(median(&[300, -1, 20]), Some(20));
/// assert_eq!(median(&[]), None);
/// ```
pub fn median(observations: &[Observation]) -> Option<Observation> {
    if observations.is_empty() {
        return None;
    }
    let mut sorted = observations.to_vec();
    sorted.sort();
    Some(sorted[sorted.len() / 2])
}
