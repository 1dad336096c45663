pub mod indexed_slice;
pub mod newtype_index;
pub mod time;
