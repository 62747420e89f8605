pub use crate::dprintln; // Make the macro available
pub use crate::*;
pub use anyhow::{Result as R, anyhow};
pub use byteorder::{BigEndian, WriteBytesExt};

pub use std::io::{Cursor, Write};
