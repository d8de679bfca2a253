//! Renderizado de snapshots: serializador de grafos y árbol de rutas.

pub mod serializer;
pub mod tree;

pub use serializer::{breadcrumb, copy_marker, serialize, serialize_map, PathSeg};
pub use tree::{build_tree, split_path, tree_of};
