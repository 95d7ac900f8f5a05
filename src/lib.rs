//! College knowledge graph: CSV rows become subject-relation-object triples,
//! the triples become a directed graph, and the graph is rendered as an
//! interactive vis-network page.

pub mod build_graph;
pub mod error;
pub mod extract_entities;

pub use build_graph::{create_college_graph, render_html, write_html, CollegeGraph};
pub use error::{GraphError, Result};
pub use extract_entities::{extract_from_csv, EntityType, Triple};
