//! Baskets Repository

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
};
use trolley::{
    basket::{Basket, BasketParts, BasketUuid},
    definitions::DiscountDefinitionUuid,
    discounts::{BasketDiscount, ItemDiscount, PercentageDiscount},
    items::{Item, ItemError, ProductId},
    shipping::{Country, ShippingDetails},
};
use uuid::Uuid;

use crate::{
    database::Db,
    repository::{RepositoryError, invalid_column, u64_from_db, u64_to_db},
};

use super::BasketsRepository;

const GET_BASKET_SQL: &str = include_str!("../sql/get_basket.sql");
const LIST_BASKETS_SQL: &str = include_str!("../sql/list_baskets.sql");
const GET_BASKET_VERSION_SQL: &str = include_str!("../sql/get_basket_version.sql");
const CREATE_BASKET_SQL: &str = include_str!("../sql/create_basket.sql");
const UPDATE_BASKET_SQL: &str = include_str!("../sql/update_basket.sql");
const GET_BASKET_ITEMS_SQL: &str = include_str!("../sql/get_basket_items.sql");
const CREATE_BASKET_ITEM_SQL: &str = include_str!("../sql/create_basket_item.sql");
const UPDATE_BASKET_ITEM_SQL: &str = include_str!("../sql/update_basket_item.sql");
const DELETE_REMOVED_BASKET_ITEMS_SQL: &str =
    include_str!("../sql/delete_removed_basket_items.sql");

#[derive(Debug, Clone)]
pub struct PgBasketsRepository {
    db: Db,
}

impl PgBasketsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn load_items(
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
    ) -> Result<Vec<Item>, sqlx::Error> {
        let rows = query_as::<Postgres, ItemRow>(GET_BASKET_ITEMS_SQL)
            .bind(basket.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    async fn insert_item(
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
        position: i32,
        item: &Item,
    ) -> Result<ProductId, sqlx::Error> {
        let (discount_type, discount_amount) = discount_columns(item)?;

        let product_id = query_scalar::<Postgres, i64>(CREATE_BASKET_ITEM_SQL)
            .bind(basket.into_uuid())
            .bind(position)
            .bind(item.name())
            .bind(u64_to_db("unit_price", item.unit_price())?)
            .bind(i64::from(item.quantity()))
            .bind(discount_type)
            .bind(discount_amount)
            .fetch_one(&mut **tx)
            .await?;

        ProductId::new(u64_from_db("product_id", product_id)?)
            .map_err(|e| invalid_column("product_id", e))
    }

    async fn update_item(
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
        product_id: ProductId,
        position: i32,
        item: &Item,
    ) -> Result<u64, sqlx::Error> {
        let (discount_type, discount_amount) = discount_columns(item)?;

        let rows_affected = query(UPDATE_BASKET_ITEM_SQL)
            .bind(u64_to_db("product_id", product_id.get())?)
            .bind(basket.into_uuid())
            .bind(position)
            .bind(item.name())
            .bind(u64_to_db("unit_price", item.unit_price())?)
            .bind(i64::from(item.quantity()))
            .bind(discount_type)
            .bind(discount_amount)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn save_items(
        tx: &mut Transaction<'_, Postgres>,
        basket: &mut Basket,
    ) -> Result<(), RepositoryError> {
        let uuid = basket.uuid();

        let kept = basket
            .items()
            .iter()
            .filter_map(Item::product_id)
            .map(|id| u64_to_db("product_id", id.get()))
            .collect::<Result<Vec<_>, _>>()?;

        query(DELETE_REMOVED_BASKET_ITEMS_SQL)
            .bind(uuid.into_uuid())
            .bind(kept.as_slice())
            .execute(&mut **tx)
            .await?;

        let mut assigned = Vec::new();

        for (idx, item) in basket.items().iter().enumerate() {
            let position = i32::try_from(idx).map_err(|e| invalid_column("position", e))?;

            match item.product_id() {
                Some(product_id) => {
                    let rows_affected =
                        Self::update_item(tx, uuid, product_id, position, item).await?;

                    if rows_affected == 0 {
                        return Err(RepositoryError::InvalidReference);
                    }
                }
                None => assigned.push(Self::insert_item(tx, uuid, position, item).await?),
            }
        }

        let mut assigned = assigned.into_iter();

        basket
            .assign_pending_product_ids(|| {
                assigned
                    .next()
                    .ok_or(ItemError::InvalidProductId)
            })
            .map_err(|error| RepositoryError::InvalidData(error.to_string()))
    }

    async fn stored_version(
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
    ) -> Result<Option<u64>, sqlx::Error> {
        query_scalar::<Postgres, i64>(GET_BASKET_VERSION_SQL)
            .bind(basket.into_uuid())
            .fetch_optional(&mut **tx)
            .await?
            .map(|version| u64_from_db("version", version))
            .transpose()
    }
}

#[async_trait]
impl BasketsRepository for PgBasketsRepository {
    async fn get_basket(&self, uuid: BasketUuid) -> Result<Basket, RepositoryError> {
        let mut tx = self.db.begin().await?;

        let row = query_as::<Postgres, BasketRow>(GET_BASKET_SQL)
            .bind(uuid.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        let items = Self::load_items(&mut tx, uuid).await?;

        tx.commit().await?;

        Ok(row.into_basket(items))
    }

    async fn list_baskets(&self) -> Result<Vec<Basket>, RepositoryError> {
        let mut tx = self.db.begin().await?;

        let rows = query_as::<Postgres, BasketRow>(LIST_BASKETS_SQL)
            .fetch_all(&mut *tx)
            .await?;

        let mut baskets = Vec::with_capacity(rows.len());

        for row in rows {
            let items = Self::load_items(&mut tx, row.uuid).await?;

            baskets.push(row.into_basket(items));
        }

        tx.commit().await?;

        Ok(baskets)
    }

    async fn create_basket(&self, basket: &Basket) -> Result<(), RepositoryError> {
        let mut tx = self.db.begin().await?;

        let columns = BasketColumns::from_basket(basket)?;

        query(CREATE_BASKET_SQL)
            .bind(basket.uuid().into_uuid())
            .bind(columns.definition)
            .bind(columns.discount_code)
            .bind(columns.discount_percentage)
            .bind(columns.shipping_country)
            .bind(columns.shipping_cost)
            .bind(u64_to_db("version", basket.version())?)
            .execute(&mut *tx)
            .await?;

        for (idx, item) in basket.items().iter().enumerate() {
            let position = i32::try_from(idx).map_err(|e| invalid_column("position", e))?;

            Self::insert_item(&mut tx, basket.uuid(), position, item).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn save_basket(&self, basket: &Basket) -> Result<Basket, RepositoryError> {
        let mut tx = self.db.begin().await?;

        let columns = BasketColumns::from_basket(basket)?;

        let version = query_scalar::<Postgres, i64>(UPDATE_BASKET_SQL)
            .bind(basket.uuid().into_uuid())
            .bind(columns.definition)
            .bind(columns.discount_code)
            .bind(columns.discount_percentage)
            .bind(columns.shipping_country)
            .bind(columns.shipping_cost)
            .bind(u64_to_db("version", basket.version())?)
            .fetch_optional(&mut *tx)
            .await?;

        if version.is_none() {
            return match Self::stored_version(&mut tx, basket.uuid()).await? {
                Some(stored) => Err(RepositoryError::Stale {
                    loaded: basket.version(),
                    stored,
                }),
                None => Err(RepositoryError::NotFound),
            };
        }

        let mut saved = basket.clone();

        Self::save_items(&mut tx, &mut saved).await?;

        tx.commit().await?;

        saved.bump_version();

        Ok(saved)
    }
}

struct BasketColumns {
    definition: Option<Uuid>,
    discount_code: Option<String>,
    discount_percentage: Option<Decimal>,
    shipping_country: Option<i16>,
    shipping_cost: Option<i64>,
}

impl BasketColumns {
    fn from_basket(basket: &Basket) -> Result<Self, sqlx::Error> {
        let (discount_code, discount_percentage) = match basket.discount() {
            Some(BasketDiscount::Percentage(discount)) => (
                Some(discount.code().to_string()),
                Some(discount.percentage()),
            ),
            None => (None, None),
        };

        let shipping_cost = basket
            .shipping()
            .map(|shipping| u64_to_db("shipping_cost", shipping.cost))
            .transpose()?;

        Ok(Self {
            definition: basket
                .discount_definition()
                .map(DiscountDefinitionUuid::into_uuid),
            discount_code,
            discount_percentage,
            shipping_country: basket
                .shipping()
                .and_then(|shipping| shipping.country)
                .map(|country| i16::from(country.code())),
            shipping_cost,
        })
    }
}

fn discount_columns(item: &Item) -> Result<(Option<i16>, Option<i64>), sqlx::Error> {
    let Some(discount) = item.discount() else {
        return Ok((None, None));
    };

    let (tag, amount) = discount.to_persisted();

    let amount = match discount {
        ItemDiscount::FlatAmount { .. } => Some(u64_to_db("discount_amount", amount)?),
        ItemDiscount::BuyOneGetOneFree => None,
    };

    Ok((Some(i16::from(tag)), amount))
}

struct BasketRow {
    uuid: BasketUuid,
    definition: Option<DiscountDefinitionUuid>,
    discount: Option<BasketDiscount>,
    shipping: Option<ShippingDetails>,
    version: u64,
}

impl BasketRow {
    fn into_basket(self, items: Vec<Item>) -> Basket {
        Basket::from_parts(BasketParts {
            uuid: self.uuid,
            items,
            shipping: self.shipping,
            discount: self.discount,
            discount_definition: self.definition,
            version: self.version,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for BasketRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let code: Option<String> = row.try_get("discount_code")?;
        let percentage: Option<Decimal> = row.try_get("discount_percentage")?;

        let discount = match (code, percentage) {
            (Some(code), Some(percentage)) => Some(
                PercentageDiscount::new(code, percentage)
                    .map_err(|e| invalid_column("discount_percentage", e))?
                    .into(),
            ),
            _ => None,
        };

        let country = row
            .try_get::<Option<i16>, _>("shipping_country")?
            .map(|code| {
                u8::try_from(code)
                    .ok()
                    .and_then(Country::from_code)
                    .ok_or_else(|| {
                        invalid_column("shipping_country", format!("unknown country code {code}"))
                    })
            })
            .transpose()?;

        let shipping = row
            .try_get::<Option<i64>, _>("shipping_cost")?
            .map(|cost| u64_from_db("shipping_cost", cost))
            .transpose()?
            .map(|cost| ShippingDetails { country, cost });

        Ok(Self {
            uuid: BasketUuid::from_uuid(row.try_get("uuid")?),
            definition: row
                .try_get::<Option<Uuid>, _>("discount_definition_uuid")?
                .map(DiscountDefinitionUuid::from_uuid),
            discount,
            shipping,
            version: u64_from_db("version", row.try_get("version")?)?,
        })
    }
}

struct ItemRow(Item);

impl<'r> FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let product_id = ProductId::new(u64_from_db("product_id", row.try_get("product_id")?)?)
            .map_err(|e| invalid_column("product_id", e))?;

        let quantity = u32::try_from(row.try_get::<i64, _>("quantity")?)
            .map_err(|e| invalid_column("quantity", e))?;

        let discount = row
            .try_get::<Option<i16>, _>("discount_type")?
            .map(|tag| {
                let tag = u8::try_from(tag).map_err(|e| invalid_column("discount_type", e))?;

                let amount = row
                    .try_get::<Option<i64>, _>("discount_amount")?
                    .map(|amount| u64_from_db("discount_amount", amount))
                    .transpose()?;

                ItemDiscount::from_persisted(tag, amount)
                    .map_err(|e| invalid_column("discount_type", e))
            })
            .transpose()?;

        let item = Item::from_store(
            product_id,
            row.try_get::<String, _>("name")?,
            u64_from_db("unit_price", row.try_get("unit_price")?)?,
            quantity,
            discount,
        )
        .map_err(|e| invalid_column("name", e))?;

        Ok(Self(item))
    }
}
