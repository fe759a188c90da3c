mod core;
mod run;


pub use self::core::{OUT_BUF_CAP, OutBuf, convert_bytes, strip_bom};
pub use self::run::{ConvertError, convert_in_place, convert_to_file};
