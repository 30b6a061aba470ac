use super::normalizer::normalize_sku;
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct FeedRecord {
    pub(crate) normalized_sku: String,
    pub(crate) price: Option<f64>,
    pub(crate) quantity: Option<u32>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<FeedRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<FeedRow>() {
        let row = record?;
        let normalized_sku = normalize_sku(&row.sku);
        if normalized_sku.is_empty() {
            continue;
        }

        records.push(FeedRecord {
            normalized_sku,
            price: row.price(),
            quantity: row.quantity(),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct FeedRow {
    #[serde(rename = "SKU")]
    sku: String,
    #[serde(rename = "Price", default, deserialize_with = "empty_string_as_none")]
    price: Option<String>,
    #[serde(rename = "Quantity", default, deserialize_with = "empty_string_as_none")]
    quantity: Option<String>,
}

impl FeedRow {
    fn price(&self) -> Option<f64> {
        self.price
            .as_deref()
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value > 0.0)
    }

    fn quantity(&self) -> Option<u32> {
        self.quantity
            .as_deref()
            .and_then(|value| value.parse::<u32>().ok())
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
pub(crate) fn parse_for_tests(raw: &str) -> Result<Vec<FeedRecord>, csv::Error> {
    parse_records(std::io::Cursor::new(raw.as_bytes().to_vec()))
}
