pub mod cleansed;
pub mod raw;

pub use cleansed::CleansedStore;
pub use raw::RawStore;
