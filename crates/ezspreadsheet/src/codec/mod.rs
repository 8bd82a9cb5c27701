pub mod record;
pub mod value;

pub use record::{FieldCursor, decode_cells, decode_row, encode_record, header_row};
pub use value::ValueCodec;
