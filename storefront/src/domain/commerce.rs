//! Storefront records mirrored between the local cache and the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Collection, EntityKey, ProductId, PromoCode, SyncableEntity};

/// A catalog product.
///
/// `number_reviews` and `review_stars` are derived from the product's reviews
/// and rewritten whenever a review is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable catalog identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Brand name.
    pub brand: String,
    /// Category the product is listed under.
    pub category_name: String,
    /// Unit price in minor currency units.
    pub price_cents: u64,
    /// Product-level discount, if any.
    #[serde(default)]
    pub sale_percent: Option<u8>,
    /// Remote image URLs.
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Number of reviews.
    #[serde(default)]
    pub number_reviews: u32,
    /// Mean review rating truncated to whole stars.
    #[serde(default)]
    pub review_stars: u8,
}

impl SyncableEntity for Product {
    const COLLECTION: Collection = Collection::Products;

    fn key(&self) -> EntityKey {
        EntityKey::from(&self.id)
    }
}

/// A product the user marked as favourite, for a given size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    /// Product marked as favourite.
    pub product_id: ProductId,
    /// Selected size, if the product is sized.
    #[serde(default)]
    pub size: Option<String>,
    /// Selected colour, if any.
    #[serde(default)]
    pub color: Option<String>,
}

impl SyncableEntity for Favorite {
    const COLLECTION: Collection = Collection::Favorites;

    fn key(&self) -> EntityKey {
        EntityKey::product_scoped(
            &self.product_id,
            &[self.size.as_deref(), self.color.as_deref()],
        )
    }
}

/// One line in the shopping bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product in the bag.
    pub product_id: ProductId,
    /// Selected size.
    #[serde(default)]
    pub size: Option<String>,
    /// Selected colour.
    #[serde(default)]
    pub color: Option<String>,
    /// Number of units.
    pub quantity: u32,
}

impl SyncableEntity for CartItem {
    const COLLECTION: Collection = Collection::Cart;

    fn key(&self) -> EntityKey {
        EntityKey::product_scoped(
            &self.product_id,
            &[self.size.as_deref(), self.color.as_deref()],
        )
    }
}

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted and awaiting delivery.
    #[default]
    Processing,
    /// Delivered to the customer.
    Delivered,
    /// Cancelled before delivery.
    Cancelled,
}

/// A placed order and the bag lines it was placed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier.
    pub id: Uuid,
    /// Bag lines captured at checkout.
    pub lines: Vec<CartItem>,
    /// Applied promotion code.
    #[serde(default)]
    pub promo_code: Option<PromoCode>,
    /// Shipping address used for the order.
    #[serde(default)]
    pub shipping_address_id: Option<Uuid>,
    /// Charged total in minor currency units.
    pub total_cents: u64,
    /// Fulfilment state.
    #[serde(default)]
    pub status: OrderStatus,
    /// Checkout timestamp.
    pub placed_at: DateTime<Utc>,
}

impl SyncableEntity for Order {
    const COLLECTION: Collection = Collection::Orders;

    fn key(&self) -> EntityKey {
        EntityKey::from(&self.id)
    }
}

/// A shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Address identifier.
    pub id: Uuid,
    /// Recipient name.
    pub full_name: String,
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
    /// State, province or region.
    #[serde(default)]
    pub region: Option<String>,
    /// Postal code.
    pub postal_code: String,
    /// Country name.
    pub country: String,
}

impl SyncableEntity for Address {
    const COLLECTION: Collection = Collection::Addresses;

    fn key(&self) -> EntityKey {
        EntityKey::from(&self.id)
    }
}

/// A promotion code and its discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promo {
    /// Code entered at checkout.
    pub code: PromoCode,
    /// Discount applied to the bag total.
    pub sale_percent: u8,
    /// Last day the code is valid.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SyncableEntity for Promo {
    const COLLECTION: Collection = Collection::Promos;

    fn key(&self) -> EntityKey {
        EntityKey::from(&self.code)
    }
}

/// Total of `lines` priced against `products`, with `promo` applied.
///
/// Lines whose product is unknown contribute nothing. Product-level sale
/// percentages apply per line; the promo applies to the discounted sum.
///
/// # Examples
/// ```
/// use storefront::domain::{CartItem, Product, ProductId, bag_total_cents};
///
/// let id = ProductId::new("p-1").expect("valid id");
/// let product = Product {
///     id: id.clone(),
///     title: "Dress".into(),
///     brand: "Mango".into(),
///     category_name: "Dresses".into(),
///     price_cents: 2_000,
///     sale_percent: None,
///     image_urls: vec![],
///     tags: vec![],
///     number_reviews: 0,
///     review_stars: 0,
/// };
/// let line = CartItem { product_id: id, size: None, color: None, quantity: 2 };
/// assert_eq!(bag_total_cents(&[line], &[product], None), 4_000);
/// ```
pub fn bag_total_cents(lines: &[CartItem], products: &[Product], promo: Option<&Promo>) -> u64 {
    let subtotal: u64 = lines
        .iter()
        .filter_map(|line| {
            products
                .iter()
                .find(|product| product.id == line.product_id)
                .map(|product| {
                    let unit = apply_percent(product.price_cents, product.sale_percent.unwrap_or(0));
                    unit.saturating_mul(u64::from(line.quantity))
                })
        })
        .fold(0_u64, u64::saturating_add);
    apply_percent(subtotal, promo.map_or(0, |promo| promo.sale_percent))
}

fn apply_percent(amount: u64, percent: u8) -> u64 {
    let kept = 100_u64.saturating_sub(u64::from(percent.min(100)));
    amount.saturating_mul(kept) / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn product_id(raw: &str) -> ProductId {
        ProductId::new(raw).expect("valid product id")
    }

    #[fixture]
    fn dress() -> Product {
        Product {
            id: product_id("p-dress"),
            title: "Evening Dress".to_owned(),
            brand: "Dorothy Perkins".to_owned(),
            category_name: "Dresses".to_owned(),
            price_cents: 1_000,
            sale_percent: Some(20),
            image_urls: Vec::new(),
            tags: Vec::new(),
            number_reviews: 0,
            review_stars: 0,
        }
    }

    #[rstest]
    fn cart_key_includes_size_and_colour() {
        let line = CartItem {
            product_id: product_id("p-1"),
            size: Some("M".to_owned()),
            color: Some("red".to_owned()),
            quantity: 1,
        };
        assert_eq!(line.key().as_str(), "p-1:M:red");
    }

    #[rstest]
    fn favorite_key_keeps_an_empty_size_segment() {
        let favorite = Favorite {
            product_id: product_id("p-9"),
            size: None,
            color: Some("blue".to_owned()),
        };
        assert_eq!(favorite.key().as_str(), "p-9::blue");
    }

    #[rstest]
    fn favorites_differing_only_by_colour_have_distinct_keys() {
        let black = Favorite {
            product_id: product_id("p-9"),
            size: Some("S".to_owned()),
            color: Some("black".to_owned()),
        };
        let white = Favorite {
            color: Some("white".to_owned()),
            ..black.clone()
        };
        assert_ne!(black.key(), white.key());
    }

    #[rstest]
    fn cart_lines_with_swapped_size_and_colour_have_distinct_keys() {
        let sized = CartItem {
            product_id: product_id("p-1"),
            size: Some("M".to_owned()),
            color: None,
            quantity: 1,
        };
        let coloured = CartItem {
            size: None,
            color: Some("M".to_owned()),
            ..sized.clone()
        };
        assert_eq!(sized.key().as_str(), "p-1:M:");
        assert_eq!(coloured.key().as_str(), "p-1::M");
    }

    #[rstest]
    fn order_key_is_hyphenated_uuid() {
        let id = Uuid::new_v4();
        let order = Order {
            id,
            lines: Vec::new(),
            promo_code: None,
            shipping_address_id: None,
            total_cents: 0,
            status: OrderStatus::Processing,
            placed_at: Utc::now(),
        };
        assert_eq!(order.key().as_str(), id.to_string());
    }

    #[rstest]
    fn bag_total_applies_product_sale_then_promo(dress: Product) {
        let line = CartItem {
            product_id: dress.id.clone(),
            size: None,
            color: None,
            quantity: 3,
        };
        let promo = Promo {
            code: PromoCode::new("HALF").expect("valid code"),
            sale_percent: 50,
            expires_at: None,
        };

        // 3 x (1000 - 20%) = 2400, then 50% off.
        assert_eq!(bag_total_cents(&[line], &[dress], Some(&promo)), 1_200);
    }

    #[rstest]
    fn bag_total_ignores_unknown_products(dress: Product) {
        let line = CartItem {
            product_id: product_id("p-missing"),
            size: None,
            color: None,
            quantity: 1,
        };
        assert_eq!(bag_total_cents(&[line], &[dress], None), 0);
    }

    #[rstest]
    fn product_round_trips_through_camel_case(dress: Product) {
        let value = serde_json::to_value(&dress).expect("serialise product");
        assert_eq!(value["categoryName"], "Dresses");
        assert_eq!(value["priceCents"], 1_000);
    }
}
