//! Document-level field skip: scalars defer to `colbin-field`; containers
//! are fast-forwarded through their own iterator rather than duplicating
//! length logic here.

use crate::array_it::ArrayIterator;
use crate::column_it::ColumnIterator;
use crate::error::DocResult;
use crate::object_it::ObjectIterator;
use colbin_field::FieldType;
use colbin_memfile::MemFile;

/// Skips the field whose marker was just consumed (cursor sits at the start
/// of its payload, one byte past the marker).
pub fn skip_field(file: &mut MemFile, marker: FieldType) -> DocResult<()> {
    if marker.is_traversable() {
        let marker_at = file.tell() - 1;
        if marker.is_array() {
            ArrayIterator::open(file, marker_at)?.fast_forward()
        } else if marker.is_object() {
            ObjectIterator::open(file, marker_at)?.fast_forward()
        } else {
            ColumnIterator::open(file, marker_at)?.fast_forward()
        }
    } else {
        colbin_field::skip::skip_payload(file, marker).map_err(Into::into)
    }
}
