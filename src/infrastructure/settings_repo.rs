//! Store settings kept as JSON documents in `app_settings`.

use bigdecimal::{BigDecimal, Zero};
use diesel::prelude::*;
use diesel::upsert::excluded;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::DomainError;
use crate::domain::ports::{CheckoutSettings, SettingsSource};
use crate::domain::pricing::Coupon;
use crate::schema::app_settings;

use super::diesel_store::DieselStore;
use super::models::{decode, encode, SettingRow};

pub const DELIVERY_CONFIG: &str = "delivery_config";
pub const HOME_SCREEN: &str = "home_screen";
pub const SHOP_CONTROLS: &str = "shop_controls";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryConfig {
    #[serde(default = "BigDecimal::zero")]
    min_order_amount: BigDecimal,
}

#[derive(Debug, Serialize, Deserialize)]
struct HomeScreen {
    #[serde(default)]
    offers: Vec<Coupon>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShopControls {
    #[serde(default = "shop_open")]
    online_orders: bool,
}

fn shop_open() -> bool {
    true
}

/// Folds the raw documents into checkout settings. Missing documents keep
/// their defaults; unknown keys are ignored.
pub fn settings_from_documents<I>(documents: I) -> Result<CheckoutSettings, DomainError>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut settings = CheckoutSettings::default();
    for (key, value) in documents {
        match key.as_str() {
            DELIVERY_CONFIG => {
                let doc: DeliveryConfig = decode(value, DELIVERY_CONFIG)?;
                settings.min_order_amount = doc.min_order_amount;
            }
            HOME_SCREEN => {
                let doc: HomeScreen = decode(value, HOME_SCREEN)?;
                settings.coupons = doc.offers;
            }
            SHOP_CONTROLS => {
                let doc: ShopControls = decode(value, SHOP_CONTROLS)?;
                settings.online_orders = doc.online_orders;
            }
            _ => {}
        }
    }
    Ok(settings)
}

pub(crate) fn load_settings(conn: &mut PgConnection) -> Result<CheckoutSettings, DomainError> {
    let rows: Vec<SettingRow> = app_settings::table
        .filter(app_settings::key.eq_any([DELIVERY_CONFIG, HOME_SCREEN, SHOP_CONTROLS]))
        .select(SettingRow::as_select())
        .load(conn)?;
    settings_from_documents(rows.into_iter().map(|r| (r.key, r.value)))
}

impl DieselStore {
    /// Writes all three settings documents. Used by administration tooling and tests.
    pub fn put_settings(&self, settings: &CheckoutSettings) -> Result<(), DomainError> {
        let rows = vec![
            SettingRow {
                key: DELIVERY_CONFIG.to_string(),
                value: encode(
                    &DeliveryConfig {
                        min_order_amount: settings.min_order_amount.clone(),
                    },
                    DELIVERY_CONFIG,
                )?,
            },
            SettingRow {
                key: HOME_SCREEN.to_string(),
                value: encode(
                    &HomeScreen {
                        offers: settings.coupons.clone(),
                    },
                    HOME_SCREEN,
                )?,
            },
            SettingRow {
                key: SHOP_CONTROLS.to_string(),
                value: encode(
                    &ShopControls {
                        online_orders: settings.online_orders,
                    },
                    SHOP_CONTROLS,
                )?,
            },
        ];

        let mut conn = self.conn()?;
        diesel::insert_into(app_settings::table)
            .values(&rows)
            .on_conflict(app_settings::key)
            .do_update()
            .set((
                app_settings::value.eq(excluded(app_settings::value)),
                app_settings::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;
        Ok(())
    }
}

impl SettingsSource for DieselStore {
    fn checkout_settings(&self) -> Result<CheckoutSettings, DomainError> {
        let mut conn = self.conn()?;
        load_settings(&mut conn)
    }
}
