//! Mapping a raw IL offset to the sequence point that covers it.

use crate::error::{IlmapError, IlmapResult};
use crate::types::SequencePoint;

/// Find the best sequence point for `il_offset` in `points` (ascending by
/// offset).
///
/// Returns the point with the largest offset not exceeding `il_offset`. When
/// every point lies past `il_offset`, the first point is returned: an
/// instruction pointer in a method prologue still belongs to the method's
/// first statement.
///
/// ## Errors
///
/// `NotFound` when `points` is empty.
pub fn nearest_sequence_point(points: &[SequencePoint], il_offset: u32) -> IlmapResult<&SequencePoint>
{
    let Some(mut nearest) = points.first() else {
        return Err(IlmapError::NotFound(format!(
            "no sequence points to match IL offset {il_offset:#x}"
        )));
    };

    for point in points {
        if point.offset < il_offset {
            nearest = point;
            continue;
        }
        if point.offset == il_offset {
            nearest = point;
        }
        break;
    }

    Ok(nearest)
}
