pub mod kv;
pub mod quote_cache;
