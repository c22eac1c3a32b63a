//! # Price Conversion
//!
//! Looks up an item's price for the selected provider and converts it to
//! the display currency.
//!
//! ```text
//! price = safe_multiply(
//!     prices[get_price_key(item)][settings.source.title],
//!     settings.currencyPrice[settings.currency],
//! )
//! ```
//!
//! A missing entry, provider or rate makes the result NaN ("unknown").
//! Callers that render a number pass `nan_to_zero = true`.

use serde_json::Value;

use crate::currency::format_currency;
use crate::pricing::arith::{safe_multiply, to_number_opt};
use crate::pricing::key::get_price_key;
use crate::reducers::pricing::PricingState;
use crate::reducers::settings::SettingsState;
use crate::types::ItemRow;

/// Borrowed view over settings and known prices.
#[derive(Debug, Clone, Copy)]
pub struct PriceConverter<'a> {
    settings: &'a SettingsState,
    pricing: &'a PricingState,
}

impl<'a> PriceConverter<'a> {
    pub fn new(settings: &'a SettingsState, pricing: &'a PricingState) -> Self {
        PriceConverter { settings, pricing }
    }

    pub fn settings(&self) -> &'a SettingsState {
        self.settings
    }

    pub fn pricing(&self) -> &'a PricingState {
        self.pricing
    }

    /// The key `item` is (or would be) stored under.
    pub fn price_key(&self, item: &ItemRow) -> String {
        get_price_key(item, Some(&self.pricing.prices))
    }

    /// Converted price of one item; NaN when unknown unless `nan_to_zero`.
    pub fn get_price(&self, item: &ItemRow, nan_to_zero: bool) -> f64 {
        let key = self.price_key(item);
        let source_price = to_number_opt(
            self.pricing
                .prices
                .get(&key)
                .zip(self.settings.source_title())
                .and_then(|(entry, title)| entry.get(title))
                .map(provider_value),
        );
        let rate = to_number_opt(self.settings.currency_rate());
        zero_if(nan_to_zero, safe_multiply(source_price, rate))
    }

    /// `get_price × multiplier`, e.g. a stack quantity.
    pub fn get_price_with_multiplier(&self, item: &ItemRow, multiplier: f64, nan_to_zero: bool) -> f64 {
        let price = self.get_price(item, nan_to_zero);
        zero_if(nan_to_zero, safe_multiply(price, multiplier))
    }

    pub fn format_price(&self, price: f64) -> String {
        format_currency(price, self.settings.currency_code(), self.settings.locale_code())
    }

    pub fn get_formatted_price(&self, item: &ItemRow, nan_to_zero: bool) -> String {
        self.format_price(self.get_price(item, nan_to_zero))
    }

    /// Formatted price of a combined row (`price × combined_QTY`). Never NaN.
    pub fn get_formatted_price_combined(&self, item: &ItemRow) -> String {
        let quantity = item.combined_qty().unwrap_or(f64::NAN);
        self.format_price(self.get_price_with_multiplier(item, quantity, true))
    }
}

/// A provider entry is either a bare number or an object carrying `price`.
fn provider_value(entry: &Value) -> &Value {
    match entry {
        Value::Object(map) => map.get("price").unwrap_or(&Value::Null),
        other => other,
    }
}

#[inline]
fn zero_if(nan_to_zero: bool, value: f64) -> f64 {
    if nan_to_zero && value.is_nan() {
        0.0
    } else {
        value
    }
}
