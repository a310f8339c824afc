/// One-byte tag introducing every value in a document payload. Values are
/// distinct across key kinds (see `colbin-document::key`), field types, and
/// container terminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldType {
    Null = 0x00,
    True = 0x01,
    False = 0x02,
    U8 = 0x03,
    U16 = 0x04,
    U32 = 0x05,
    U64 = 0x06,
    I8 = 0x07,
    I16 = 0x08,
    I32 = 0x09,
    I64 = 0x0A,
    Float = 0x0B,
    String = 0x0C,
    Binary = 0x0D,
    BinaryCustom = 0x0E,
    Array = 0x0F,
    ArrayEnd = 0x10,
    Object = 0x11,
    ObjectEnd = 0x12,
    ColumnU8 = 0x13,
    ColumnU16 = 0x14,
    ColumnU32 = 0x15,
    ColumnU64 = 0x16,
    ColumnI8 = 0x17,
    ColumnI16 = 0x18,
    ColumnI32 = 0x19,
    ColumnI64 = 0x1A,
    ColumnFloat = 0x1B,
    ColumnBoolean = 0x1C,
}

impl FieldType {
    pub fn from_byte(b: u8) -> Option<FieldType> {
        use FieldType::*;
        Some(match b {
            0x00 => Null,
            0x01 => True,
            0x02 => False,
            0x03 => U8,
            0x04 => U16,
            0x05 => U32,
            0x06 => U64,
            0x07 => I8,
            0x08 => I16,
            0x09 => I32,
            0x0A => I64,
            0x0B => Float,
            0x0C => String,
            0x0D => Binary,
            0x0E => BinaryCustom,
            0x0F => Array,
            0x10 => ArrayEnd,
            0x11 => Object,
            0x12 => ObjectEnd,
            0x13 => ColumnU8,
            0x14 => ColumnU16,
            0x15 => ColumnU32,
            0x16 => ColumnU64,
            0x17 => ColumnI8,
            0x18 => ColumnI16,
            0x19 => ColumnI32,
            0x1A => ColumnI64,
            0x1B => ColumnFloat,
            0x1C => ColumnBoolean,
            _ => return None,
        })
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn is_constant(self) -> bool {
        matches!(self, FieldType::Null | FieldType::True | FieldType::False)
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, FieldType::True | FieldType::False)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            FieldType::I8 | FieldType::I16 | FieldType::I32 | FieldType::I64
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            FieldType::U8 | FieldType::U16 | FieldType::U32 | FieldType::U64
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, FieldType::Float)
    }

    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_number(self) -> bool {
        self.is_integer() || self.is_floating()
    }

    pub fn is_string(self) -> bool {
        matches!(self, FieldType::String)
    }

    pub fn is_binary(self) -> bool {
        matches!(self, FieldType::Binary | FieldType::BinaryCustom)
    }

    pub fn is_array(self) -> bool {
        matches!(self, FieldType::Array)
    }

    pub fn is_object(self) -> bool {
        matches!(self, FieldType::Object)
    }

    pub fn is_column(self) -> bool {
        matches!(
            self,
            FieldType::ColumnU8
                | FieldType::ColumnU16
                | FieldType::ColumnU32
                | FieldType::ColumnU64
                | FieldType::ColumnI8
                | FieldType::ColumnI16
                | FieldType::ColumnI32
                | FieldType::ColumnI64
                | FieldType::ColumnFloat
                | FieldType::ColumnBoolean
        )
    }

    /// Container-like: array, object, or column. The source's term for
    /// "has child content reached through an iterator".
    pub fn is_traversable(self) -> bool {
        self.is_array() || self.is_object() || self.is_column()
    }

    pub fn get_class(self) -> FieldClass {
        if self.is_constant() {
            FieldClass::Constant
        } else if self.is_traversable() {
            FieldClass::Container
        } else if self.is_string(){
            FieldClass::CharacterString
        } else if self.is_binary() {
            FieldClass::BinaryString
        } else {
            FieldClass::Number
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Constant,
    Number,
    CharacterString,
    BinaryString,
    Container,
}

/// The ten homogeneous element types a column may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Float,
    Boolean,
}

impl ColumnType {
    pub const ALL: [ColumnType; 10] = [
        ColumnType::U8,
        ColumnType::U16,
        ColumnType::U32,
        ColumnType::U64,
        ColumnType::I8,
        ColumnType::I16,
        ColumnType::I32,
        ColumnType::I64,
        ColumnType::Float,
        ColumnType::Boolean,
    ];

    /// Width in bytes of one element slot in the column's payload.
    pub fn element_size(self) -> usize {
        match self {
            ColumnType::U8 | ColumnType::I8 | ColumnType::Boolean => 1,
            ColumnType::U16 | ColumnType::I16 => 2,
            ColumnType::U32 | ColumnType::I32 | ColumnType::Float => 4,
            ColumnType::U64 | ColumnType::I64 => 8,
        }
    }

    /// Maps to the column's own field marker (distinct from the element's
    /// regular scalar marker).
    pub fn to_field_type(self) -> FieldType {
        match self {
            ColumnType::U8 => FieldType::ColumnU8,
            ColumnType::U16 => FieldType::ColumnU16,
            ColumnType::U32 => FieldType::ColumnU32,
            ColumnType::U64 => FieldType::ColumnU64,
            ColumnType::I8 => FieldType::ColumnI8,
            ColumnType::I16 => FieldType::ColumnI16,
            ColumnType::I32 => FieldType::ColumnI32,
            ColumnType::I64 => FieldType::ColumnI64,
            ColumnType::Float => FieldType::ColumnFloat,
            ColumnType::Boolean => FieldType::ColumnBoolean,
        }
    }

    pub fn from_field_type(ft: FieldType) -> Option<ColumnType> {
        Some(match ft {
            FieldType::ColumnU8 => ColumnType::U8,
            FieldType::ColumnU16 => ColumnType::U16,
            FieldType::ColumnU32 => ColumnType::U32,
            FieldType::ColumnU64 => ColumnType::U64,
            FieldType::ColumnI8 => ColumnType::I8,
            FieldType::ColumnI16 => ColumnType::I16,
            FieldType::ColumnI32 => ColumnType::I32,
            FieldType::ColumnI64 => ColumnType::I64,
            FieldType::ColumnFloat => ColumnType::Float,
            FieldType::ColumnBoolean => ColumnType::Boolean,
            _ => return None,
        })
    }

    /// The regular (non-column) scalar marker this element type would use
    /// once promoted into a heterogeneous array. Boolean has no single
    /// scalar marker: a live boolean element becomes `True` or `False`
    /// depending on its value, decided by the caller.
    pub fn promoted_scalar_type(self) -> Option<FieldType> {
        match self {
            ColumnType::U8 => Some(FieldType::U8),
            ColumnType::U16 => Some(FieldType::U16),
            ColumnType::U32 => Some(FieldType::U32),
            ColumnType::U64 => Some(FieldType::U64),
            ColumnType::I8 => Some(FieldType::I8),
            ColumnType::I16 => Some(FieldType::I16),
            ColumnType::I32 => Some(FieldType::I32),
            ColumnType::I64 => Some(FieldType::I64),
            ColumnType::Float => Some(FieldType::Float),
            ColumnType::Boolean => None,
        }
    }
}
