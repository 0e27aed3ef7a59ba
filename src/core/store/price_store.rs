use anyhow::Result;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::core::client::azure::PriceItem;

pub const METRIC_NAME: &str = "azure_prices";

const LABEL_CURRENCY_CODE: &str = "currencyCode";
const LABEL_LOCATION: &str = "location";
const LABEL_ARM_SKU_NAME: &str = "armSkuName";
const LABEL_RESERVATION_TERM: &str = "reservationTerm";

/// Label set identifying one gauge value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceKey {
    pub currency_code: String,
    pub location: String,
    pub arm_sku_name: String,
    pub reservation_term: String,
}

impl From<&PriceItem> for PriceKey {
    fn from(item: &PriceItem) -> Self {
        Self {
            currency_code: item.currency_code.clone(),
            location: item.location.clone(),
            arm_sku_name: item.arm_sku_name.clone(),
            reservation_term: item.reservation_term.clone(),
        }
    }
}

/// Live price gauge behind the exporter endpoint. The aggregator is the
/// only writer; readers scrape a consistent per-key value at any time.
/// Keys are never evicted: a price set once stays visible as the last
/// known good value until process exit.
pub struct PriceStore {
    registry: Registry,
    gauge: GaugeVec,
}

impl PriceStore {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let gauge = GaugeVec::new(
            Opts::new(METRIC_NAME, "Azure prices"),
            &[
                LABEL_CURRENCY_CODE,
                LABEL_LOCATION,
                LABEL_ARM_SKU_NAME,
                LABEL_RESERVATION_TERM,
            ],
        )?;
        registry.register(Box::new(gauge.clone()))?;
        Ok(Self { registry, gauge })
    }

    /// Writer path: overwrites the key's value with the retail price
    /// rounded to 4 decimal places.
    pub fn set(&self, item: &PriceItem) {
        self.gauge
            .with_label_values(&[
                &item.currency_code,
                &item.location,
                &item.arm_sku_name,
                &item.reservation_term,
            ])
            .set(round4(item.retail_price));
    }

    /// Read path for one key. Goes through `gather()` so a miss does not
    /// create the series as a side effect.
    pub fn get(&self, key: &PriceKey) -> Option<f64> {
        let families = self.registry.gather();
        let family = families.iter().find(|f| f.get_name() == METRIC_NAME)?;
        family.get_metric().iter().find_map(|metric| {
            let mut matched = 0;
            for pair in metric.get_label() {
                let want = match pair.get_name() {
                    LABEL_CURRENCY_CODE => &key.currency_code,
                    LABEL_LOCATION => &key.location,
                    LABEL_ARM_SKU_NAME => &key.arm_sku_name,
                    LABEL_RESERVATION_TERM => &key.reservation_term,
                    _ => return None,
                };
                if pair.get_value() != want.as_str() {
                    return None;
                }
                matched += 1;
            }
            (matched == 4).then(|| metric.get_gauge().get_value())
        })
    }

    /// Number of distinct keys ever written.
    pub fn len(&self) -> usize {
        self.registry
            .gather()
            .iter()
            .filter(|f| f.get_name() == METRIC_NAME)
            .map(|f| f.get_metric().len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Prometheus text exposition of every stored price.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64) -> PriceItem {
        PriceItem {
            location: "eastus".into(),
            currency_code: "USD".into(),
            arm_sku_name: "Standard_B2ms".into(),
            product_name: "Virtual Machines B2ms".into(),
            retail_price: price,
            reservation_term: "pay-as-you-go".into(),
        }
    }

    fn key() -> PriceKey {
        PriceKey {
            currency_code: "USD".into(),
            location: "eastus".into(),
            arm_sku_name: "Standard_B2ms".into(),
            reservation_term: "pay-as-you-go".into(),
        }
    }

    #[test]
    fn starts_empty() {
        let store = PriceStore::new().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.get(&key()), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = PriceStore::new().unwrap();
        store.set(&item(0.0832));
        assert_eq!(store.get(&key()), Some(0.0832));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn values_are_rounded_to_four_decimals() {
        let store = PriceStore::new().unwrap();
        store.set(&item(0.083_256_9));
        assert_eq!(store.get(&key()), Some(0.0833));
    }

    #[test]
    fn later_writes_overwrite_the_same_key() {
        let store = PriceStore::new().unwrap();
        store.set(&item(0.0832));
        store.set(&item(0.0911));
        assert_eq!(store.get(&key()), Some(0.0911));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_on_a_missing_key_does_not_create_it() {
        let store = PriceStore::new().unwrap();
        store.set(&item(0.0832));

        let mut other = key();
        other.reservation_term = "3 Years".into();
        assert_eq!(store.get(&other), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn render_emits_the_exposition_format() {
        let store = PriceStore::new().unwrap();
        store.set(&item(0.0832));

        let body = store.render().unwrap();
        assert!(body.contains("# TYPE azure_prices gauge"), "{body}");
        assert!(
            body.contains(r#"armSkuName="Standard_B2ms""#) && body.contains("0.0832"),
            "{body}"
        );
    }
}
