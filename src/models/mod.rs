pub mod recommendation;

pub use recommendation::{
    missing_fields, RecType, Recommendation, RecommendationFilter, UnknownRecType, REQUIRED_FIELDS,
};
