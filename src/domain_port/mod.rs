mod clock;
mod key_value_storage;

pub use clock::*;
pub use key_value_storage::*;
