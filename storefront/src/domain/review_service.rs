//! Review submission and the product aggregate derived from it.
//!
//! Reviews are held by the backend only. The service keeps the reviews it
//! has loaded per product for the session, and after each submission
//! recomputes the product's aggregate over that full list before pushing the
//! updated product record to the backend.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::Clock;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::ports::{ImageUploader, RemoteStore};
use super::{
    Collection, CollectionPath, EntityKey, Error, HelpfulMark, Outcome, Product, ProductId,
    Review, ReviewAggregate, ReviewDraft, SyncableEntity, UserId, decode_all, encode,
};

/// Result of a successful review submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedReview {
    /// The stored review.
    pub review: Review,
    /// Aggregate over every known review of the product.
    pub aggregate: ReviewAggregate,
    /// Product record as pushed to the backend.
    pub product: Product,
}

/// Loads, submits and aggregates product reviews for one user.
pub struct ReviewService<R, U> {
    remote: Arc<R>,
    uploader: Arc<U>,
    clock: Arc<dyn Clock>,
    user_id: UserId,
    loaded: Mutex<HashMap<ProductId, Vec<Review>>>,
}

impl<R, U> ReviewService<R, U>
where
    R: RemoteStore,
    U: ImageUploader,
{
    /// Create a review service for `user_id`.
    pub fn new(remote: Arc<R>, uploader: Arc<U>, clock: Arc<dyn Clock>, user_id: UserId) -> Self {
        Self {
            remote,
            uploader,
            clock,
            user_id,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Reviews of `product_id`, newest first.
    ///
    /// The first call per product reads the backend; later calls return the
    /// session's list, including reviews submitted since. The session list is
    /// not locked while the backend is read.
    pub async fn reviews_for(&self, product_id: &ProductId) -> Outcome<Vec<Review>> {
        if let Some(reviews) = self.loaded.lock().await.get(product_id) {
            return Ok(reviews.clone());
        }
        let fetched = self
            .all_reviews()
            .await?
            .into_iter()
            .filter(|review| &review.product_id == product_id)
            .collect();
        let mut loaded = self.loaded.lock().await;
        Ok(loaded
            .entry(product_id.clone())
            .or_insert(fetched)
            .clone())
    }

    /// Reviews written by the signed-in user across all products, newest
    /// first. Always read from the backend.
    pub async fn my_reviews(&self) -> Outcome<Vec<Review>> {
        Ok(self
            .all_reviews()
            .await?
            .into_iter()
            .filter(|review| review.user_id == self.user_id)
            .collect())
    }

    async fn all_reviews(&self) -> Outcome<Vec<Review>> {
        let documents = self
            .remote
            .get_all(&CollectionPath::shared(Collection::Reviews)?)
            .await
            .map_err(Error::from)?;
        let mut reviews = decode_all::<Review>(documents)?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    /// Submit `draft` as a review of `product`.
    ///
    /// Images are uploaded first; nothing is stored if any upload fails. Once
    /// the review is stored, the aggregate is recomputed from the complete
    /// list and the product's review count and stars are pushed to the
    /// backend. The session list is only locked to record the new review.
    pub async fn submit_review(
        &self,
        product: &Product,
        draft: ReviewDraft,
    ) -> Outcome<SubmittedReview> {
        if draft.product_id != product.id {
            return Err(Error::invalid_request(format!(
                "review targets product {} but was submitted for {}",
                draft.product_id, product.id
            )));
        }

        let known = self.reviews_for(&product.id).await?;
        let image_urls = self
            .uploader
            .upload(&draft.images)
            .await
            .map_err(Error::from)?;
        let review = Review {
            id: Uuid::new_v4(),
            user_id: self.user_id.clone(),
            product_id: draft.product_id,
            rating: draft.rating,
            text: draft.text,
            image_urls,
            created_at: self.clock.utc(),
        };
        self.remote
            .put(
                &CollectionPath::shared(Collection::Reviews)?,
                &review.key(),
                &encode(&review)?,
            )
            .await
            .map_err(Error::from)?;

        let aggregate = {
            let mut loaded = self.loaded.lock().await;
            let reviews = loaded.entry(product.id.clone()).or_insert(known);
            reviews.insert(0, review.clone());
            ReviewAggregate::from_reviews(&*reviews)
        };

        let product = Product {
            number_reviews: aggregate.count,
            review_stars: aggregate.stars(),
            ..product.clone()
        };
        self.remote
            .put(
                &CollectionPath::shared(Collection::Products)?,
                &product.key(),
                &encode(&product)?,
            )
            .await
            .map_err(Error::from)?;
        debug!(
            product_id = %product.id,
            count = aggregate.count,
            stars = product.review_stars,
            "review aggregate pushed"
        );

        Ok(SubmittedReview {
            review,
            aggregate,
            product,
        })
    }

    /// Identifiers of the reviews this user marked as helpful.
    pub async fn helpful_reviews(&self) -> Outcome<Vec<Uuid>> {
        let documents = self
            .remote
            .get_all(&self.helpful_path())
            .await
            .map_err(Error::from)?;
        let marks: Vec<HelpfulMark> = decode_all(documents)?;
        Ok(marks.into_iter().map(|mark| mark.review_id).collect())
    }

    /// Mark or unmark `review_id` as helpful.
    pub async fn mark_helpful(&self, review_id: Uuid, helpful: bool) -> Outcome<()> {
        let mark = HelpfulMark { review_id };
        let key: EntityKey = mark.key();
        let path = self.helpful_path();
        let outcome = if helpful {
            self.remote.put(&path, &key, &encode(&mark)?).await
        } else {
            self.remote.delete(&path, &key).await
        };
        outcome.map_err(Error::from)
    }

    fn helpful_path(&self) -> CollectionPath {
        CollectionPath::of_user(Collection::HelpfulReviews, &self.user_id)
    }
}

#[cfg(test)]
#[path = "review_service_tests.rs"]
mod tests;
