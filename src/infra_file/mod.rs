mod key_value_storage_file;

pub use key_value_storage_file::*;
