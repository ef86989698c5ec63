//! Aggregate rating of a review target.

use serde::Serialize;

use crate::domain::Rating;

/// Mean rating and the number of reviews behind it.
///
/// Both fields are recomputed from the full review set on every change, so
/// the summary never drifts from the reviews it describes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Arithmetic mean; 0 when there are no reviews.
    pub average: f64,
    /// Number of reviews.
    pub count: u32,
}

impl RatingSummary {
    /// Summarise a set of ratings.
    ///
    /// # Examples
    /// ```
    /// use resto_backend::domain::{Rating, RatingSummary};
    ///
    /// let ratings = [4, 2].map(|r| Rating::new(r).unwrap());
    /// let summary = RatingSummary::from_ratings(ratings);
    /// assert_eq!(summary.average, 3.0);
    /// assert_eq!(summary.count, 2);
    /// assert_eq!(RatingSummary::from_ratings([]), RatingSummary::default());
    /// ```
    #[must_use]
    pub fn from_ratings(ratings: impl IntoIterator<Item = Rating>) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0_u64, 0_u32), |(sum, count), rating| {
                (sum + u64::from(rating.value()), count.saturating_add(1))
            });
        if count == 0 {
            return Self::default();
        }
        Self {
            average: sum as f64 / f64::from(count),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ratings(values: &[i64]) -> Vec<Rating> {
        values
            .iter()
            .map(|v| Rating::new(*v).expect("valid rating"))
            .collect()
    }

    #[rstest]
    #[case(&[], 0.0, 0)]
    #[case(&[4], 4.0, 1)]
    #[case(&[4, 2], 3.0, 2)]
    #[case(&[5, 4, 4], 13.0 / 3.0, 3)]
    fn mean_and_count(#[case] values: &[i64], #[case] average: f64, #[case] count: u32) {
        let summary = RatingSummary::from_ratings(ratings(values));
        assert!((summary.average - average).abs() < f64::EPSILON);
        assert_eq!(summary.count, count);
    }
}
