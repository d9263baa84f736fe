//! Star rating value object (1 to 5 stars).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Star rating a reviewer gave the product: 1 (worst) to 5 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ReviewRating(u8);

impl ReviewRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Creates a rating, returning error if out of range.
    pub fn try_new(value: i64) -> Result<Self, ValidationError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::out_of_range(
                "rating",
                i64::from(Self::MIN),
                i64::from(Self::MAX),
                value,
            ))
        }
    }

    /// Returns the number of stars.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for ReviewRating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<ReviewRating> for u8 {
    fn from(rating: ReviewRating) -> Self {
        rating.0
    }
}

impl fmt::Display for ReviewRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_accepts_one_through_five() {
        for stars in 1..=5 {
            assert_eq!(ReviewRating::try_new(stars).unwrap().value() as i64, stars);
        }
    }

    #[test]
    fn rating_rejects_out_of_range_values() {
        assert!(ReviewRating::try_new(0).is_err());
        assert!(ReviewRating::try_new(6).is_err());
        assert!(ReviewRating::try_new(-1).is_err());
    }

    #[test]
    fn rating_displays_as_number() {
        assert_eq!(format!("{}", ReviewRating::try_new(4).unwrap()), "4");
    }

    #[test]
    fn rating_serializes_as_integer() {
        let rating = ReviewRating::try_new(3).unwrap();
        assert_eq!(serde_json::to_string(&rating).unwrap(), "3");
    }

    #[test]
    fn rating_deserialization_validates_range() {
        let rating: ReviewRating = serde_json::from_str("5").unwrap();
        assert_eq!(rating.value(), 5);

        let err = serde_json::from_str::<ReviewRating>("7").unwrap_err();
        assert!(err.to_string().contains("between 1 and 5"));
    }
}
