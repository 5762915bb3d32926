pub mod types;

pub use types::{
    GeoLocation, StateVectorRecord, canonical_timestamp, decode_epoch_segment,
    encode_epoch_segment,
};
