//! The action vocabulary the policy engine synthesizes and recognizes.
//!
//! Bucket-level actions attach to the bucket ARN; object-level actions
//! attach to `bucketARN/prefix*` resources. Together these form the full
//! set of actions a generated policy can carry, and the vocabulary
//! [`Statement::is_valid`](crate::Statement::is_valid) checks against.

use crate::set::StringSet;

/// Bucket action granted by every non-`None` policy.
pub const COMMON_BUCKET_ACTIONS: [&str; 1] = ["s3:GetBucketLocation"];

/// Bucket actions required for read access to a prefix.
pub const READ_ONLY_BUCKET_ACTIONS: [&str; 1] = ["s3:ListBucket"];

/// Bucket actions required for write access to a prefix.
pub const WRITE_ONLY_BUCKET_ACTIONS: [&str; 1] = ["s3:ListBucketMultipartUploads"];

/// Object actions granted by read access.
pub const READ_ONLY_OBJECT_ACTIONS: [&str; 1] = ["s3:GetObject"];

/// Object actions granted by write access.
pub const WRITE_ONLY_OBJECT_ACTIONS: [&str; 4] = [
    "s3:AbortMultipartUpload",
    "s3:DeleteObject",
    "s3:ListMultipartUploadParts",
    "s3:PutObject",
];

/// The common bucket actions as a set.
#[must_use]
pub fn common_bucket_actions() -> StringSet {
    COMMON_BUCKET_ACTIONS.into_iter().collect()
}

/// The read bucket actions as a set.
#[must_use]
pub fn read_only_bucket_actions() -> StringSet {
    READ_ONLY_BUCKET_ACTIONS.into_iter().collect()
}

/// The write bucket actions as a set.
#[must_use]
pub fn write_only_bucket_actions() -> StringSet {
    WRITE_ONLY_BUCKET_ACTIONS.into_iter().collect()
}

/// The read object actions as a set.
#[must_use]
pub fn read_only_object_actions() -> StringSet {
    READ_ONLY_OBJECT_ACTIONS.into_iter().collect()
}

/// The write object actions as a set.
#[must_use]
pub fn write_only_object_actions() -> StringSet {
    WRITE_ONLY_OBJECT_ACTIONS.into_iter().collect()
}

/// Read and write object actions combined.
#[must_use]
pub fn read_write_object_actions() -> StringSet {
    let mut set = read_only_object_actions();
    set.union_with(&write_only_object_actions());
    set
}

/// Every action the engine knows about.
#[must_use]
pub fn valid_actions() -> StringSet {
    let mut set = common_bucket_actions();
    set.union_with(&read_only_bucket_actions());
    set.union_with(&write_only_bucket_actions());
    set.union_with(&read_only_object_actions());
    set.union_with(&write_only_object_actions());
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_combine_read_write_object_actions() {
        let rw = read_write_object_actions();
        assert_eq!(rw.len(), 5);
        assert!(rw.contains("s3:GetObject"));
        assert!(rw.contains("s3:PutObject"));
    }

    #[test]
    fn test_should_cover_all_actions_in_vocabulary() {
        let all = valid_actions();
        assert_eq!(all.len(), 8);
        assert!(all.contains("s3:GetBucketLocation"));
        assert!(all.contains("s3:ListBucketMultipartUploads"));
        assert!(all.contains("s3:AbortMultipartUpload"));
    }
}
