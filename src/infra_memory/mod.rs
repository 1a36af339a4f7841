mod clock_manual;
mod key_value_storage_memory;

pub use clock_manual::*;
pub use key_value_storage_memory::*;
