pub mod geodesic;
pub mod subpath;
