use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt::Display, str::FromStr};

use crate::error::{AppError, AppResult};

/// Fields a request body must carry to describe a recommendation
pub const REQUIRED_FIELDS: [&str; 5] = [
    "product_id",
    "product_name",
    "rec_id",
    "rec_name",
    "rec_type",
];

/// Relationship between a source product and the product recommended for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecType {
    CrossSell,
    UpSell,
    Accessory,
    BuyWith,
}

impl RecType {
    pub const ALL: [RecType; 4] = [
        RecType::CrossSell,
        RecType::UpSell,
        RecType::Accessory,
        RecType::BuyWith,
    ];

    /// Stored and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RecType::CrossSell => "CROSS_SELL",
            RecType::UpSell => "UP_SELL",
            RecType::Accessory => "ACCESSORY",
            RecType::BuyWith => "BUY_WITH",
        }
    }
}

impl Display for RecType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string names no known recommendation type
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid rec_type '{0}': expected one of CROSS_SELL, UP_SELL, ACCESSORY, BUY_WITH")]
pub struct UnknownRecType(pub String);

impl FromStr for RecType {
    type Err = UnknownRecType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecType::ALL
            .into_iter()
            .find(|rec_type| rec_type.as_str() == s)
            .ok_or_else(|| UnknownRecType(s.to_string()))
    }
}

impl TryFrom<String> for RecType {
    type Error = UnknownRecType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UnknownRecType> for AppError {
    fn from(err: UnknownRecType) -> Self {
        AppError::DataValidation(err.to_string())
    }
}

/// A product-to-product recommendation edge with a like counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Recommendation {
    /// Assigned by the store on first persistence
    pub id: Option<i64>,
    pub product_id: i64,
    pub product_name: String,
    pub rec_id: i64,
    pub rec_name: String,
    #[sqlx(try_from = "String")]
    pub rec_type: RecType,
    pub like_num: i32,
}

/// Body shape accepted once required-field presence has been checked
#[derive(Debug, Deserialize)]
struct RecommendationPayload {
    #[serde(default)]
    id: Option<i64>,
    product_id: i64,
    product_name: String,
    rec_id: i64,
    rec_name: String,
    rec_type: String,
    #[serde(default)]
    like_num: Option<i32>,
}

impl RecommendationPayload {
    fn parse(data: &Value) -> AppResult<Self> {
        let object = data.as_object().ok_or_else(|| {
            AppError::DataValidation(
                "Invalid Recommendation: body of request contained bad or no data".to_string(),
            )
        })?;

        let missing = missing_fields(object);
        if !missing.is_empty() {
            return Err(AppError::DataValidation(format!(
                "Invalid Recommendation: missing {}",
                missing.join(", ")
            )));
        }

        let payload: RecommendationPayload = serde_json::from_value(data.clone())
            .map_err(|e| AppError::DataValidation(format!("Invalid Recommendation: {}", e)))?;

        if let Some(like_num) = payload.like_num {
            if like_num < 0 {
                return Err(AppError::DataValidation(
                    "Invalid Recommendation: like_num must not be negative".to_string(),
                ));
            }
        }

        Ok(payload)
    }
}

/// Required fields absent from (or null in) a JSON object, in declaration order
pub fn missing_fields(object: &Map<String, Value>) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .into_iter()
        .filter(|field| object.get(*field).map_or(true, Value::is_null))
        .collect()
}

impl Recommendation {
    /// Creates an unsaved recommendation with no likes
    pub fn new(
        product_id: i64,
        product_name: impl Into<String>,
        rec_id: i64,
        rec_name: impl Into<String>,
        rec_type: RecType,
    ) -> Self {
        Self {
            id: None,
            product_id,
            product_name: product_name.into(),
            rec_id,
            rec_name: rec_name.into(),
            rec_type,
            like_num: 0,
        }
    }

    /// Builds a recommendation from a JSON request body.
    ///
    /// Every field in [`REQUIRED_FIELDS`] must be present; all missing names are
    /// reported together. `id` and `like_num` are optional.
    pub fn from_json(data: &Value) -> AppResult<Self> {
        let payload = RecommendationPayload::parse(data)?;
        let rec_type = payload.rec_type.parse()?;

        Ok(Self {
            id: payload.id,
            product_id: payload.product_id,
            product_name: payload.product_name,
            rec_id: payload.rec_id,
            rec_name: payload.rec_name,
            rec_type,
            like_num: payload.like_num.unwrap_or(0),
        })
    }

    /// Overwrites the mutable fields from a JSON request body.
    ///
    /// Leaves `self` untouched when the body is invalid. An absent `like_num`
    /// keeps the current count.
    pub fn update_from_json(&mut self, data: &Value) -> AppResult<()> {
        let payload = RecommendationPayload::parse(data)?;
        let rec_type = payload.rec_type.parse()?;

        self.product_id = payload.product_id;
        self.product_name = payload.product_name;
        self.rec_id = payload.rec_id;
        self.rec_name = payload.rec_name;
        self.rec_type = rec_type;
        if let Some(like_num) = payload.like_num {
            self.like_num = like_num;
        }
        Ok(())
    }

    pub fn like(&mut self) {
        self.like_num = self.like_num.saturating_add(1);
    }

    /// Decrements the like counter, stopping at zero
    pub fn unlike(&mut self) {
        self.like_num = (self.like_num - 1).max(0);
    }
}

/// Conjunctive filter over recommendation rows; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationFilter {
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub rec_id: Option<i64>,
    pub rec_name: Option<String>,
    pub rec_type: Option<RecType>,
}

impl RecommendationFilter {
    pub fn by_product_id(product_id: i64) -> Self {
        Self {
            product_id: Some(product_id),
            ..Default::default()
        }
    }

    pub fn by_product_name(product_name: impl Into<String>) -> Self {
        Self {
            product_name: Some(product_name.into()),
            ..Default::default()
        }
    }

    pub fn by_rec_id(rec_id: i64) -> Self {
        Self {
            rec_id: Some(rec_id),
            ..Default::default()
        }
    }

    pub fn by_rec_name(rec_name: impl Into<String>) -> Self {
        Self {
            rec_name: Some(rec_name.into()),
            ..Default::default()
        }
    }

    pub fn by_rec_type(rec_type: RecType) -> Self {
        Self {
            rec_type: Some(rec_type),
            ..Default::default()
        }
    }

    /// True when no criterion is set, i.e. the filter selects every row
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, rec: &Recommendation) -> bool {
        self.product_id.map_or(true, |v| rec.product_id == v)
            && self.product_name.as_ref().map_or(true, |v| &rec.product_name == v)
            && self.rec_id.map_or(true, |v| rec.rec_id == v)
            && self.rec_name.as_ref().map_or(true, |v| &rec.rec_name == v)
            && self.rec_type.map_or(true, |v| rec.rec_type == v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Recommendation {
        Recommendation::new(1, "foo", 2, "bar", RecType::UpSell)
    }

    #[test]
    fn test_rec_type_parses_every_variant() {
        for rec_type in RecType::ALL {
            assert_eq!(rec_type.as_str().parse::<RecType>(), Ok(rec_type));
        }
    }

    #[test]
    fn test_rec_type_rejects_unknown_and_lowercase() {
        assert!("DOWN_SELL".parse::<RecType>().is_err());
        assert!("up_sell".parse::<RecType>().is_err());
    }

    #[test]
    fn test_rec_type_serialization() {
        let json = serde_json::to_string(&RecType::BuyWith).unwrap();
        assert_eq!(json, "\"BUY_WITH\"");
    }

    #[test]
    fn test_serialize_shape() {
        let mut rec = sample();
        rec.id = Some(7);
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "product_id": 1,
                "product_name": "foo",
                "rec_id": 2,
                "rec_name": "bar",
                "rec_type": "UP_SELL",
                "like_num": 0
            })
        );
    }

    #[test]
    fn test_from_json_reads_serialized_form() {
        let mut rec = sample();
        rec.id = Some(3);
        rec.like_num = 5;
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(Recommendation::from_json(&value).unwrap(), rec);
    }

    #[test]
    fn test_from_json_defaults_optional_fields() {
        let rec = Recommendation::from_json(&json!({
            "product_id": 1,
            "product_name": "foo",
            "rec_id": 2,
            "rec_name": "bar",
            "rec_type": "ACCESSORY"
        }))
        .unwrap();
        assert_eq!(rec.id, None);
        assert_eq!(rec.like_num, 0);
        assert_eq!(rec.rec_type, RecType::Accessory);
    }

    #[test]
    fn test_from_json_lists_all_missing_fields() {
        let err = Recommendation::from_json(&json!({
            "product_id": 1,
            "rec_name": null
        }))
        .unwrap_err();
        match err {
            AppError::DataValidation(msg) => assert_eq!(
                msg,
                "Invalid Recommendation: missing product_name, rec_id, rec_name, rec_type"
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = Recommendation::from_json(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, AppError::DataValidation(_)));
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        let err = Recommendation::from_json(&json!({
            "product_id": "one",
            "product_name": "foo",
            "rec_id": 2,
            "rec_name": "bar",
            "rec_type": "UP_SELL"
        }))
        .unwrap_err();
        assert!(matches!(err, AppError::DataValidation(_)));
    }

    #[test]
    fn test_from_json_rejects_unknown_rec_type() {
        let err = Recommendation::from_json(&json!({
            "product_id": 1,
            "product_name": "foo",
            "rec_id": 2,
            "rec_name": "bar",
            "rec_type": "SIDEWAYS_SELL"
        }))
        .unwrap_err();
        match err {
            AppError::DataValidation(msg) => assert!(msg.contains("SIDEWAYS_SELL")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_json_rejects_negative_likes() {
        let err = Recommendation::from_json(&json!({
            "product_id": 1,
            "product_name": "foo",
            "rec_id": 2,
            "rec_name": "bar",
            "rec_type": "UP_SELL",
            "like_num": -1
        }))
        .unwrap_err();
        assert!(matches!(err, AppError::DataValidation(_)));
    }

    #[test]
    fn test_update_from_json_keeps_likes_when_absent() {
        let mut rec = sample();
        rec.id = Some(9);
        rec.like_num = 4;
        rec.update_from_json(&json!({
            "product_id": 10,
            "product_name": "baz",
            "rec_id": 20,
            "rec_name": "qux",
            "rec_type": "CROSS_SELL"
        }))
        .unwrap();
        assert_eq!(rec.id, Some(9));
        assert_eq!(rec.product_name, "baz");
        assert_eq!(rec.rec_type, RecType::CrossSell);
        assert_eq!(rec.like_num, 4);
    }

    #[test]
    fn test_update_from_json_leaves_entity_untouched_on_error() {
        let mut rec = sample();
        let before = rec.clone();
        assert!(rec.update_from_json(&json!({ "product_id": 99 })).is_err());
        assert_eq!(rec, before);
    }

    #[test]
    fn test_like_and_unlike_floor_at_zero() {
        let mut rec = sample();
        rec.unlike();
        assert_eq!(rec.like_num, 0);
        rec.like();
        rec.like();
        assert_eq!(rec.like_num, 2);
        rec.unlike();
        assert_eq!(rec.like_num, 1);
    }

    #[test]
    fn test_filter_intersection() {
        let rec = sample();
        assert!(RecommendationFilter::default().is_empty());
        assert!(RecommendationFilter::default().matches(&rec));

        let filter = RecommendationFilter {
            product_id: Some(1),
            rec_type: Some(RecType::UpSell),
            ..Default::default()
        };
        assert!(!filter.is_empty());
        assert!(filter.matches(&rec));

        let filter = RecommendationFilter {
            product_id: Some(1),
            rec_type: Some(RecType::BuyWith),
            ..Default::default()
        };
        assert!(!filter.matches(&rec));
        assert!(!RecommendationFilter::by_rec_name("nope").matches(&rec));
    }
}
