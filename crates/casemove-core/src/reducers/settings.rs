//! Settings slice: theme, locale, currency, price source, table columns.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::Action;
use crate::shape::{self, normalize_from_value, object_or_empty, Lenient};
use crate::state::Normalize;
use crate::types::{Overview, PriceSource};

/// Table columns shown on a fresh install.
pub const DEFAULT_COLUMNS: [&str; 6] = [
    "Price",
    "Stickers/patches",
    "Storage",
    "Tradehold",
    "Moveable",
    "Inventory link",
];

const KNOWN: &[&str] = &[
    "fastMove",
    "theme",
    "currency",
    "locale",
    "os",
    "steamLoginShow",
    "devmode",
    "columns",
    "currencyPrice",
    "source",
    "overview",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct SettingsState {
    #[serde(rename = "fastMove")]
    pub fast_move: Lenient<bool>,
    pub theme: Lenient<String>,
    /// ISO code of the display currency.
    pub currency: Lenient<String>,
    pub locale: Lenient<String>,
    pub os: Lenient<String>,
    #[serde(rename = "steamLoginShow")]
    pub steam_login_show: Lenient<bool>,
    pub devmode: Lenient<bool>,
    pub columns: Vec<Lenient<String>>,
    /// Currency code → rate relative to the feed's unit.
    #[serde(rename = "currencyPrice")]
    pub currency_price: Map<String, Value>,
    pub source: Lenient<PriceSource>,
    pub overview: Lenient<Overview>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

normalize_from_value!(SettingsState);

impl Default for SettingsState {
    fn default() -> Self {
        Self::initial()
    }
}

impl SettingsState {
    pub fn initial() -> Self {
        SettingsState {
            fast_move: Lenient::new(false),
            theme: Lenient::new("dark".to_string()),
            currency: Lenient::new("USD".to_string()),
            locale: Lenient::new("EN-GB".to_string()),
            os: Lenient::new(String::new()),
            steam_login_show: Lenient::new(true),
            devmode: Lenient::new(false),
            columns: DEFAULT_COLUMNS
                .iter()
                .map(|c| Lenient::new(c.to_string()))
                .collect(),
            currency_price: Map::new(),
            source: Lenient::new(PriceSource::steam_listing()),
            overview: Lenient::new(Overview::initial()),
            extra: Map::new(),
        }
    }

    /// Active currency code, empty when unset or not a string.
    pub fn currency_code(&self) -> &str {
        self.currency.as_str().unwrap_or_default()
    }

    pub fn locale_code(&self) -> &str {
        self.locale.as_str().unwrap_or_default()
    }

    /// Provider key of the selected price source, e.g. "steam_listing".
    pub fn source_title(&self) -> Option<&str> {
        self.source.as_value().get("title").and_then(Value::as_str)
    }

    /// Rate for the active currency, if one has been recorded.
    pub fn currency_rate(&self) -> Option<&Value> {
        self.currency_price.get(self.currency_code())
    }

    pub fn reduce(&self, action: &Action) -> Self {
        let mut next = self.clone();
        match action {
            Action::SettingsSetFastMove(value) => next.fast_move = Lenient::new(*value),
            Action::SettingsSetTheme(theme) => next.theme = Lenient::new(theme.clone()),
            Action::SettingsSetColumns(columns) => {
                next.columns = columns.iter().cloned().map(Lenient::new).collect()
            }
            Action::SettingsSetCurrency(Some(code)) => next.currency = Lenient::new(code.clone()),
            Action::SettingsSetCurrency(None) => {}
            Action::SettingsSetSteamLoginShow(value) => {
                next.steam_login_show = Lenient::new(*value)
            }
            Action::SettingsSetSource(source) => next.source = Lenient::new(source.clone()),
            Action::SettingsSetLocale(locale) => next.locale = Lenient::new(locale.clone()),
            Action::SettingsSetOs(os) => next.os = Lenient::new(os.clone()),
            Action::SettingsSetDevmode(value) => next.devmode = Lenient::new(*value),
            Action::SettingsSetOverview(overview) => {
                next.overview = Lenient::new(overview.clone())
            }
            Action::SettingsAddCurrencyPrice(rate) => {
                next.currency_price
                    .insert(rate.currency.clone(), Value::from(rate.rate));
                next.currency = Lenient::new(rate.currency.clone());
            }
            Action::SignOut => return Self::initial(),
            _ => {}
        }
        next
    }
}

impl Normalize for SettingsState {
    fn normalize(raw: &Value) -> Self {
        let obj = object_or_empty(raw);
        let initial = Self::initial();
        SettingsState {
            fast_move: shape::field(obj, "fastMove").unwrap_or(initial.fast_move),
            theme: shape::field(obj, "theme").unwrap_or(initial.theme),
            currency: shape::field(obj, "currency").unwrap_or(initial.currency),
            locale: shape::field(obj, "locale").unwrap_or(initial.locale),
            os: shape::field(obj, "os").unwrap_or(initial.os),
            steam_login_show: shape::field(obj, "steamLoginShow")
                .unwrap_or(initial.steam_login_show),
            devmode: shape::field(obj, "devmode").unwrap_or(initial.devmode),
            columns: shape::seq(obj, "columns").unwrap_or(initial.columns),
            currency_price: shape::mapping(obj, "currencyPrice").unwrap_or(initial.currency_price),
            source: shape::object_field(obj, "source").unwrap_or(initial.source),
            overview: shape::object_field(obj, "overview").unwrap_or(initial.overview),
            extra: shape::extra(obj, KNOWN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::CurrencyRate;
    use serde_json::json;

    #[test]
    fn test_normalize_heals_null_containers() {
        let state = SettingsState::normalize(&json!({
            "theme": "light",
            "columns": null,
            "currencyPrice": "broken",
            "source": null
        }));
        assert_eq!(state.theme, "light");
        assert_eq!(state.columns.len(), DEFAULT_COLUMNS.len());
        assert!(state.currency_price.is_empty());
        assert_eq!(state.source.get(), Some(PriceSource::steam_listing()));
        assert_eq!(state.overview.get(), Some(Overview::initial()));
    }

    #[test]
    fn test_valid_containers_survive_verbatim() {
        let raw = json!({
            "columns": ["Price", 5, "Storage"],
            "source": { "title": "buff163", "name": "Buff", "avatar": "", "beta": true },
            "overview": { "by": "volume" },
            "theme": 7,
            "os": null
        });
        let back = SettingsState::normalize(&raw).reduce(&Action::Unknown("X".into()));
        let back = serde_json::to_value(&back).unwrap();
        for key in ["columns", "source", "overview", "theme", "os"] {
            assert_eq!(back[key], raw[key], "{} changed", key);
        }
        assert_eq!(back["locale"], json!("EN-GB"));
    }

    #[test]
    fn test_odd_scalars_read_as_defaults() {
        let state = SettingsState::normalize(&json!({ "currency": 3, "source": { "name": "x" } }));
        assert_eq!(state.currency_code(), "");
        assert_eq!(state.currency_rate(), None);
        assert_eq!(state.source_title(), None);
    }

    #[test]
    fn test_add_currency_price_merges_and_selects() {
        let state = SettingsState::initial().reduce(&Action::SettingsAddCurrencyPrice(
            CurrencyRate {
                currency: "EUR".to_string(),
                rate: 0.92,
            },
        ));
        let state = state.reduce(&Action::SettingsAddCurrencyPrice(CurrencyRate {
            currency: "GBP".to_string(),
            rate: 0.79,
        }));
        assert_eq!(state.currency, "GBP");
        assert_eq!(state.currency_price["EUR"], json!(0.92));
        assert_eq!(state.currency_rate(), Some(&json!(0.79)));
    }

    #[test]
    fn test_set_currency_true_is_noop() {
        let state = SettingsState::initial();
        assert_eq!(state.reduce(&Action::SettingsSetCurrency(None)), state);
    }

    #[test]
    fn test_unknown_action_self_heals() {
        let raw = json!({ "columns": null, "future": 1 });
        let state = SettingsState::normalize(&raw).reduce(&Action::Unknown("X".into()));
        assert!(!state.columns.is_empty());
        assert_eq!(state.extra["future"], json!(1));
    }

    #[test]
    fn test_serde_routes_through_normalizer() {
        let state: SettingsState =
            serde_json::from_value(json!({ "columns": null, "devmode": true })).unwrap();
        assert_eq!(state.devmode, true);
        assert_eq!(state.columns[0], "Price");

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["steamLoginShow"], json!(true));
        assert_eq!(value["overview"]["chartRight"], json!("itemDistribution"));
    }

    #[test]
    fn test_sign_out_resets() {
        let state = SettingsState::initial().reduce(&Action::SettingsSetTheme("light".into()));
        assert_eq!(state.reduce(&Action::SignOut), SettingsState::initial());
    }
}
