//! Edge list normalization, CSR and DODG construction, and degree-descending relabeling.

pub mod csr;
pub mod dedup;
pub mod dodg;
pub mod reorder;

pub use csr::{build_csr, degrees_of};
pub use dedup::{dedup_edges, verify_canonical, Deduplicated};
pub use dodg::{build_dodg, rank_lt, Dodg};
pub use reorder::{apply_permutation, degree_descending_order, reorder_graph};
