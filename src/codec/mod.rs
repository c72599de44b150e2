//! Storage codec for effect trees.
//!
//! - `flatten` / `reconstruct`: nested arena tree <-> flat parent-pointer list
//! - `unnest` / `nest`: compendium-authored nested form <-> arena tree
//! - `parse_compact`: the `@{key=value; ...}` reference encoding
//!
//! Round-trip law: `reconstruct(flatten(t)) == t`, including child order
//! within every edge.

mod compact;
mod flat;
mod nested;

pub use compact::{coerce_value, parse_compact};
pub use flat::{flatten, flatten_under, reconstruct, CodecError, FlatList};
pub use nested::{nest, resolve_compact, unnest, unnest_json, NestedEdges, NestedNode, NodeRef};
