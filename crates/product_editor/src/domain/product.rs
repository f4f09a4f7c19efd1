//! Product entity and its mapping to and from form values.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use forms::validator::as_number;

/// Form fields bound to product properties, in render order.
pub const FORM_FIELDS: [&str; 4] = ["productName", "unitPrice", "unitInStock", "categoryId"];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// `0` marks a product that was never saved.
    pub id: u64,
    pub product_name: String,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub unit_in_stock: Option<u32>,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Empty product used in creation mode.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    /// Values to patch into the edit form.
    pub fn form_values(&self) -> Map<String, Value> {
        let all = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        FORM_FIELDS
            .iter()
            .map(|key| {
                let value = all.get(*key).cloned().unwrap_or(Value::Null);
                (key.to_string(), value)
            })
            .collect()
    }

    /// Copy form values over this product. Properties the form does not
    /// carry keep their current value.
    pub fn overlay(&self, values: &Map<String, Value>) -> Result<Product, serde_json::Error> {
        overlay(self, values)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// Overlay `values` on the serialized form of `entity` and read it back.
///
/// Numeric text is converted to a JSON number first; whole numbers become
/// integers so they fit integer properties.
pub fn overlay<T>(entity: &T, values: &Map<String, Value>) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = match serde_json::to_value(entity)? {
        Value::Object(map) => map,
        other => return serde_json::from_value(other),
    };
    for (key, value) in values {
        let value = match merged.get(key) {
            Some(Value::String(_)) => value.clone(),
            _ => coerce_number(value),
        };
        merged.insert(key.clone(), value);
    }
    serde_json::from_value(Value::Object(merged))
}

fn coerce_number(value: &Value) -> Value {
    let Value::String(_) = value else {
        return value.clone();
    };
    match as_number(value) {
        Some(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Value::from(n as i64),
        Some(n) => Number::from_f64(n).map_or_else(|| value.clone(), Value::Number),
        None => value.clone(),
    }
}
