//! Product reviews and the aggregate derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Collection, EntityKey, ProductId, SyncableEntity, UserId};

/// Star rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

/// Error returned when a rating falls outside `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 1 and 5, got {value}")]
pub struct RatingOutOfRange {
    /// The rejected value.
    pub value: u8,
}

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Validate and wrap a star count.
    pub fn new(value: u8) -> Result<Self, RatingOutOfRange> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingOutOfRange { value })
        }
    }

    /// Star count.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Reference to an image on the device, prior to upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalImageRef(String);

impl LocalImageRef {
    /// Wrap a device-local image reference.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the reference.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A review as submitted from the device, before images are uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    /// Reviewed product.
    pub product_id: ProductId,
    /// Star rating.
    pub rating: Rating,
    /// Review body.
    pub text: String,
    /// Images to upload and attach.
    pub images: Vec<LocalImageRef>,
}

/// A persisted product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Review identifier.
    pub id: Uuid,
    /// Author.
    pub user_id: UserId,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Star rating.
    pub rating: Rating,
    /// Review body.
    pub text: String,
    /// Uploaded image URLs.
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl SyncableEntity for Review {
    const COLLECTION: Collection = Collection::Reviews;

    fn key(&self) -> EntityKey {
        EntityKey::from(&self.id)
    }
}

/// Marks a review as helpful for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpfulMark {
    /// Review marked as helpful.
    pub review_id: Uuid,
}

impl SyncableEntity for HelpfulMark {
    const COLLECTION: Collection = Collection::HelpfulReviews;

    fn key(&self) -> EntityKey {
        EntityKey::from(&self.review_id)
    }
}

/// Review count and mean rating of one product.
///
/// Always recomputed from the full review set; never patched incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAggregate {
    /// Number of reviews.
    pub count: u32,
    /// Arithmetic mean of all ratings, `0.0` when there are none.
    pub mean_rating: f64,
}

impl ReviewAggregate {
    /// Compute the aggregate over `reviews`.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::{Rating, ReviewAggregate};
    ///
    /// let ratings = [4, 5, 3].map(|value| Rating::new(value).expect("valid rating"));
    /// let aggregate = ReviewAggregate::from_ratings(ratings);
    /// assert_eq!(aggregate.count, 3);
    /// assert_eq!(aggregate.stars(), 4);
    /// ```
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Rating>,
    {
        let (count, sum) = ratings
            .into_iter()
            .fold((0_u32, 0_u64), |(count, sum), rating| {
                (count.saturating_add(1), sum + u64::from(rating.get()))
            });
        let mean_rating = if count == 0 {
            0.0
        } else {
            sum as f64 / f64::from(count)
        };
        Self { count, mean_rating }
    }

    /// Compute the aggregate over full review records.
    pub fn from_reviews<'a, I>(reviews: I) -> Self
    where
        I: IntoIterator<Item = &'a Review>,
    {
        Self::from_ratings(reviews.into_iter().map(|review| review.rating))
    }

    /// Mean rating truncated to whole stars for display.
    pub fn stars(&self) -> u8 {
        // Truncation towards zero; the mean never exceeds Rating::MAX.
        self.mean_rating.trunc().clamp(0.0, f64::from(Rating::MAX)) as u8
    }
}
