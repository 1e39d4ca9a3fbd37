mod bson;
mod collection;

pub use bson::{serde_string_map, u32_id_filter, Id};
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
