//! Field type markers, their class predicates, NULL sentinels for column
//! elements, and the skip routine for scalar (non-container) payloads.

pub mod elem;
pub mod marker;
pub mod sentinel;
pub mod skip;

pub use elem::ColumnElement;
pub use marker::{ColumnType, FieldClass, FieldType};
pub use sentinel::{
    BooleanColumnValue, FLOAT_NULL_BITS, I16_NULL, I32_NULL, I64_NULL, I8_NULL, U16_NULL,
    U32_NULL, U64_NULL, U8_NULL,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_partition_markers() {
        for b in 0u8..=0x1C {
            let ft = FieldType::from_byte(b).unwrap();
            let containers = ft.is_array() as u8 + ft.is_object() as u8 + ft.is_column() as u8;
            assert!(containers <= 1, "marker {:?} double-classified", ft);
        }
    }

    #[test]
    fn column_type_roundtrips_through_field_type() {
        for ct in ColumnType::ALL {
            let ft = ct.to_field_type();
            assert!(ft.is_column());
            assert_eq!(ColumnType::from_field_type(ft), Some(ct));
        }
    }

    #[test]
    fn unknown_byte_is_none() {
        assert!(FieldType::from_byte(0xFF).is_none());
    }
}
