//! Generic access to fixed-width column element types, so the column
//! iterator can be written once and instantiated per type rather than
//! duplicated ten times.

use crate::marker::ColumnType;
use crate::sentinel::*;
use byteorder::{ByteOrder, LittleEndian};

pub trait ColumnElement: Copy {
    const COLUMN_TYPE: ColumnType;
    const SIZE: usize;

    fn null() -> Self;
    fn is_null(self) -> bool;
    fn read_le(bytes: &[u8]) -> Self;
    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_int_elem {
    ($ty:ty, $variant:ident, $size:expr, $null:expr, $read:path, $write:path) => {
        impl ColumnElement for $ty {
            const COLUMN_TYPE: ColumnType = ColumnType::$variant;
            const SIZE: usize = $size;

            fn null() -> Self {
                $null
            }

            fn is_null(self) -> bool {
                self == $null
            }

            fn read_le(bytes: &[u8]) -> Self {
                $read(bytes)
            }

            fn write_le(self, out: &mut [u8]) {
                $write(out, self)
            }
        }
    };
}

impl ColumnElement for u8 {
    const COLUMN_TYPE: ColumnType = ColumnType::U8;
    const SIZE: usize = 1;
    fn null() -> Self {
        U8_NULL
    }
    fn is_null(self) -> bool {
        self == U8_NULL
    }
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0]
    }
    fn write_le(self, out: &mut [u8]) {
        out[0] = self;
    }
}

impl ColumnElement for i8 {
    const COLUMN_TYPE: ColumnType = ColumnType::I8;
    const SIZE: usize = 1;
    fn null() -> Self {
        I8_NULL
    }
    fn is_null(self) -> bool {
        self == I8_NULL
    }
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }
    fn write_le(self, out: &mut [u8]) {
        out[0] = self as u8;
    }
}

impl_int_elem!(
    u16,
    U16,
    2,
    U16_NULL,
    LittleEndian::read_u16,
    LittleEndian::write_u16
);
impl_int_elem!(
    u32,
    U32,
    4,
    U32_NULL,
    LittleEndian::read_u32,
    LittleEndian::write_u32
);
impl_int_elem!(
    u64,
    U64,
    8,
    U64_NULL,
    LittleEndian::read_u64,
    LittleEndian::write_u64
);
impl_int_elem!(
    i16,
    I16,
    2,
    I16_NULL,
    LittleEndian::read_i16,
    LittleEndian::write_i16
);
impl_int_elem!(
    i32,
    I32,
    4,
    I32_NULL,
    LittleEndian::read_i32,
    LittleEndian::write_i32
);
impl_int_elem!(
    i64,
    I64,
    8,
    I64_NULL,
    LittleEndian::read_i64,
    LittleEndian::write_i64
);

impl ColumnElement for f32 {
    const COLUMN_TYPE: ColumnType = ColumnType::Float;
    const SIZE: usize = 4;

    fn null() -> Self {
        float_null()
    }

    fn is_null(self) -> bool {
        float_bits_is_null(self.to_bits())
    }

    fn read_le(bytes: &[u8]) -> Self {
        LittleEndian::read_f32(bytes)
    }

    fn write_le(self, out: &mut [u8]) {
        LittleEndian::write_f32(out, self)
    }
}
