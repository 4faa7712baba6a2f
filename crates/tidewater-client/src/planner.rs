//! Part planning for multipart uploads.
//!
//! A pure, deterministic computation: given a total payload size, decide
//! how many parts to upload and how large each one is. The resulting
//! plan always reconstructs the payload exactly:
//! `(part_count - 1) * part_size + last_part_size == total`.

use crate::error::ClientError;

/// Minimum part size: 5 MiB.
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum number of parts in one multipart upload.
pub const MAX_PARTS: u64 = 10_000;

/// Maximum size of a multipart object: 5 TiB.
pub const MAX_MULTIPART_OBJECT_SIZE: u64 = 5 * 1024 * 1024 * 1024 * 1024;

/// A fixed-shape part plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartPlan {
    /// Size of every part except possibly the last, in bytes.
    pub part_size: u64,
    /// Total number of parts, at most [`MAX_PARTS`].
    pub part_count: u32,
    /// Size of the final part, in bytes.
    pub last_part_size: u64,
}

/// Compute the part plan for a payload.
///
/// `None` means the payload length is unknown (streaming); the plan then
/// assumes the maximum object size so any stream fits. The part size is
/// `ceil(total / MAX_PARTS)` rounded up to the next multiple of
/// [`MIN_PART_SIZE`].
///
/// # Errors
///
/// Returns [`ClientError::EntityTooLarge`] when the payload exceeds
/// [`MAX_MULTIPART_OBJECT_SIZE`].
pub fn calculate_part_size(total_size: Option<u64>) -> Result<PartPlan, ClientError> {
    let total = total_size.unwrap_or(MAX_MULTIPART_OBJECT_SIZE);

    if total > MAX_MULTIPART_OBJECT_SIZE {
        return Err(ClientError::EntityTooLarge {
            size: total,
            max: MAX_MULTIPART_OBJECT_SIZE,
        });
    }

    let part_size = total.div_ceil(MAX_PARTS).div_ceil(MIN_PART_SIZE).max(1) * MIN_PART_SIZE;
    let part_count = total.div_ceil(part_size).max(1);
    let last_part_size = total - (part_count - 1) * part_size;

    #[allow(clippy::cast_possible_truncation)] // bounded by MAX_PARTS
    let part_count = part_count as u32;

    Ok(PartPlan {
        part_size,
        part_count,
        last_part_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_plan_maximum_object_size() {
        let plan = calculate_part_size(Some(5_497_558_138_880)).unwrap();
        assert_eq!(plan.part_size, 550_502_400);
        assert_eq!(plan.part_count, 9987);
        assert_eq!(plan.last_part_size, 241_172_480);
    }

    #[test]
    fn test_should_plan_five_gigabyte_object() {
        let plan = calculate_part_size(Some(5_000_000_000)).unwrap();
        assert_eq!(plan.part_size, 5_242_880);
        assert_eq!(plan.part_count, 954);
        assert_eq!(plan.last_part_size, 3_535_360);
    }

    #[test]
    fn test_should_reject_oversized_object() {
        let result = calculate_part_size(Some(5_000_000_000_000_000_000));
        match result {
            Err(ClientError::EntityTooLarge { size, max }) => {
                assert_eq!(size, 5_000_000_000_000_000_000);
                assert_eq!(max, MAX_MULTIPART_OBJECT_SIZE);
            }
            other => panic!("expected EntityTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_should_substitute_maximum_size_for_unknown_length() {
        let unknown = calculate_part_size(None).unwrap();
        let max = calculate_part_size(Some(MAX_MULTIPART_OBJECT_SIZE)).unwrap();
        assert_eq!(unknown, max);
    }

    #[test]
    fn test_should_be_deterministic() {
        let a = calculate_part_size(Some(123_456_789_012)).unwrap();
        let b = calculate_part_size(Some(123_456_789_012)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_should_reconstruct_total_exactly() {
        for total in [
            1,
            MIN_PART_SIZE - 1,
            MIN_PART_SIZE,
            MIN_PART_SIZE + 1,
            100 * MIN_PART_SIZE + 17,
            5_000_000_000,
            MAX_MULTIPART_OBJECT_SIZE,
        ] {
            let plan = calculate_part_size(Some(total)).unwrap();
            let reconstructed =
                u64::from(plan.part_count - 1) * plan.part_size + plan.last_part_size;
            assert_eq!(reconstructed, total, "total {total}");
            assert!(plan.last_part_size <= plan.part_size);
            assert!(plan.last_part_size > 0, "total {total}");
            assert!(u64::from(plan.part_count) <= MAX_PARTS);
        }
    }

    #[test]
    fn test_should_plan_single_part_for_tiny_payload() {
        let plan = calculate_part_size(Some(1)).unwrap();
        assert_eq!(plan.part_count, 1);
        assert_eq!(plan.part_size, MIN_PART_SIZE);
        assert_eq!(plan.last_part_size, 1);
    }
}
