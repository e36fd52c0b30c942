//! Feature preprocessing for the prediction pipeline
//!
//! Categorical encoding (learned or static-table) and the standard
//! scaling transform applied to assembled feature rows. Both objects are
//! fitted offline and consumed here read-only.

mod encoder;
mod scaler;

pub use encoder::{
    CategoryEncoder, EncoderRegistry, DISTRICT_FIELD, MARKET_FIELD, VARIETY_FIELD,
};
pub use scaler::StandardScaler;
