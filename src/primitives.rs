//! Parallel building blocks shared by preprocessing and the counting kernels.

pub mod bit_array;
pub mod bucket_sort;
pub mod intersect;
pub mod prefix_sum;
pub mod radix_set;
pub mod search;
pub mod worker;

pub use bit_array::BitArray;
pub use bucket_sort::{bucket_sort, bucket_sort_buffered, BucketSorted};
pub use intersect::{count_common, count_common_gallop, count_common_scalar, count_common_simd, SimdLevel};
pub use prefix_sum::{flag_prefix_sum, inclusive_prefix_sum, inclusive_prefix_sum_into, select_not_f};
pub use radix_set::{RadixFilter, RadixSet};
pub use search::{branch_free_binary_search, find_src, gallop_search, linear_search};
pub use worker::{run_chunks, worker_ranges, SharedSlice};
