//! Parallel triangle counting for large static undirected graphs.
//!
//! Raw edge list → deduplicated edges → CSR or degree-oriented DAG → degree-descending
//! relabeling → one of several counting kernels.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod graph_gen;
pub mod io_status;
pub mod loader;
pub mod preprocess;
pub mod primitives;
pub mod types;

pub use algorithms::{count_triangles, KernelStrategy, TriangleController, TriangleReport};
pub use config::RunConfig;
pub use error::{TcError, TcResult};
pub use types::{Edge, EdgeList, Graph, Orientation, VertexId, VertexPermutation, MAX_VERTEX_ID};
