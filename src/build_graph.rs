use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Directed;
use petgraph::Graph;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{GraphError, Result};
use crate::extract_entities::{color_for, EntityType, Triple};

const NODE_SIZE: u32 = 25;
const EDGE_WIDTH: u32 = 2;

const PAGE_TEMPLATE: &str = include_str!("assets/template.html");
const CONTROL_PANEL: &str = include_str!("assets/controls.html");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityNode {
    pub id: String,
    pub label: String,
    pub group: String,
    pub color: String,
    pub title: String,
    pub size: u32,
}

impl EntityNode {
    pub fn new(label: &str, entity_type: EntityType) -> Self {
        EntityNode {
            id: label.to_string(),
            label: label.to_string(),
            group: entity_type.to_string(),
            color: color_for(entity_type.as_str()).to_string(),
            title: format!("<b>{}</b><br>Type: {}", label, entity_type),
            size: NODE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationEdge {
    pub label: String,
    pub title: String,
    pub width: u32,
}

impl RelationEdge {
    pub fn new(relation: &str) -> Self {
        RelationEdge {
            label: relation.to_string(),
            title: relation.to_string(),
            width: EDGE_WIDTH,
        }
    }
}

/// Edge as vis-network expects it: endpoints by node id plus the display attributes.
#[derive(Serialize)]
struct EdgeRecord<'a> {
    from: &'a str,
    to: &'a str,
    #[serde(flatten)]
    edge: &'a RelationEdge,
}

/// Directed entity graph. Nodes are keyed by label, edges by (subject, object) pair.
#[derive(Debug, Default)]
pub struct CollegeGraph {
    graph: Graph<EntityNode, RelationEdge, Directed>,
    index: HashMap<String, NodeIndex>,
}

impl CollegeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triples(triples: &[Triple]) -> Self {
        let mut graph = CollegeGraph::new();

        for triple in triples {
            let subject = graph.upsert_node(&triple.subject, triple.subject_type);
            let object = graph.upsert_node(&triple.object, triple.object_type);
            graph.upsert_relation(subject, object, triple.relation);
        }

        log::info!(
            "Built graph with {} nodes and {} edges from {} triples",
            graph.node_count(),
            graph.edge_count(),
            triples.len()
        );

        graph
    }

    /// Inserts the node, or overwrites the attributes of an existing node with the same label.
    pub fn upsert_node(&mut self, label: &str, entity_type: EntityType) -> NodeIndex {
        let node = EntityNode::new(label, entity_type);

        match self.index.get(label) {
            Some(&idx) => {
                self.graph[idx] = node;
                idx
            }
            None => {
                let idx = self.graph.add_node(node);
                self.index.insert(label.to_string(), idx);
                idx
            }
        }
    }

    /// Adds the edge, or relabels the existing edge between the same two nodes.
    pub fn upsert_relation(&mut self, subject: NodeIndex, object: NodeIndex, relation: &str) -> EdgeIndex {
        let edge = RelationEdge::new(relation);

        match self.graph.find_edge(subject, object) {
            Some(idx) => {
                self.graph[idx] = edge;
                idx
            }
            None => self.graph.add_edge(subject, object, edge),
        }
    }

    pub fn node(&self, label: &str) -> Option<&EntityNode> {
        self.index.get(label).map(|&idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn graph(&self) -> &Graph<EntityNode, RelationEdge, Directed> {
        &self.graph
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkOptions {
    pub interaction: Interaction,
    pub physics: Physics,
    pub edges: EdgeOptions,
    pub nodes: NodeOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub hover: bool,
    pub navigation_buttons: bool,
    pub keyboard: bool,
    pub zoom_view: bool,
    pub drag_view: bool,
    pub multiselect: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Physics {
    pub enabled: bool,
    pub solver: String,
    pub force_atlas2_based: ForceAtlas2Based,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceAtlas2Based {
    pub gravitational_constant: f64,
    pub central_gravity: f64,
    pub spring_length: f64,
    pub spring_constant: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub size: u32,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeOptions {
    pub arrows: serde_json::Value,
    pub smooth: serde_json::Value,
    pub font: Font,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeOptions {
    pub shadow: bool,
    pub font: Font,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        NetworkOptions {
            interaction: Interaction {
                hover: true,
                navigation_buttons: true,
                keyboard: true,
                zoom_view: true,
                drag_view: true,
                multiselect: true,
            },
            physics: Physics {
                enabled: true,
                solver: "forceAtlas2Based".to_string(),
                force_atlas2_based: ForceAtlas2Based {
                    gravitational_constant: -50.0,
                    central_gravity: 0.01,
                    spring_length: 150.0,
                    spring_constant: 0.08,
                },
            },
            edges: EdgeOptions {
                arrows: serde_json::json!({ "to": { "enabled": true } }),
                smooth: serde_json::json!({ "type": "dynamic" }),
                font: Font {
                    size: 14,
                    color: "white".to_string(),
                },
            },
            nodes: NodeOptions {
                shadow: true,
                font: Font {
                    size: 16,
                    color: "white".to_string(),
                },
            },
        }
    }
}

/// Canvas dimensions and colors of the generated page.
#[derive(Debug, Clone)]
pub struct PageStyle {
    pub height: String,
    pub width: String,
    pub bgcolor: String,
    pub font_color: String,
}

impl Default for PageStyle {
    fn default() -> Self {
        PageStyle {
            height: "900px".to_string(),
            width: "100%".to_string(),
            bgcolor: "#0f172a".to_string(),
            font_color: "white".to_string(),
        }
    }
}

// JSON placed inside a <script> block must not close it early.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub fn render_html(graph: &CollegeGraph) -> Result<String> {
    render_html_with(graph, &NetworkOptions::default(), &PageStyle::default())
}

pub fn render_html_with(
    graph: &CollegeGraph,
    options: &NetworkOptions,
    style: &PageStyle,
) -> Result<String> {
    let g = graph.graph();

    let nodes: Vec<serde_json::Value> = g
        .node_weights()
        .map(|node| -> Result<serde_json::Value> {
            let mut value = serde_json::to_value(node)?;
            value["font"] = serde_json::json!({ "color": style.font_color });
            Ok(value)
        })
        .collect::<Result<Vec<_>>>()?;

    let edges: Vec<EdgeRecord> = g
        .edge_references()
        .map(|e| EdgeRecord {
            from: &g[e.source()].id,
            to: &g[e.target()].id,
            edge: e.weight(),
        })
        .collect();

    let page = PAGE_TEMPLATE
        .replace("{{WIDTH}}", &style.width)
        .replace("{{HEIGHT}}", &style.height)
        .replace("{{BGCOLOR}}", &style.bgcolor)
        .replace("{{NODES}}", &script_json(&nodes)?)
        .replace("{{EDGES}}", &script_json(&edges)?)
        .replace("{{OPTIONS}}", &script_json(options)?);

    Ok(format!("{}{}", page, CONTROL_PANEL))
}

/// Writes the page and returns its absolute path.
pub fn write_html<P: AsRef<Path>>(graph: &CollegeGraph, path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    fs::write(path, render_html(graph)?)?;

    let path = fs::canonicalize(path)?;
    log::info!("Wrote graph visualization to {}", path.display());
    Ok(path)
}

fn browser_command() -> Command {
    match std::env::var("BROWSER") {
        Ok(browser) if !browser.is_empty() => Command::new(browser),
        _ if cfg!(target_os = "windows") => {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        }
        _ if cfg!(target_os = "macos") => Command::new("open"),
        _ => Command::new("xdg-open"),
    }
}

pub fn open_in_browser(path: &Path) -> Result<()> {
    launch_browser(browser_command(), path)
}

fn launch_browser(mut command: Command, path: &Path) -> Result<()> {
    let url = format!("file://{}", path.display());

    log::debug!("Opening {} with {:?}", url, command.get_program());
    command
        .arg(&url)
        .spawn()
        .map_err(|e| GraphError::Browser(e.to_string()))?;

    Ok(())
}

pub fn create_college_graph<P: AsRef<Path>>(triples: &[Triple], output_path: P) -> Result<PathBuf> {
    create_college_graph_with(triples, output_path.as_ref(), browser_command())
}

fn create_college_graph_with(triples: &[Triple], output_path: &Path, browser: Command) -> Result<PathBuf> {
    let graph = CollegeGraph::from_triples(triples);
    let path = write_html(&graph, output_path)?;
    launch_browser(browser, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract_entities::extract_from_reader;

    const DATA: &str = "Student,Course,Professor,Department,College
Alice,CS101,Dr.Smith,CompSci,StateU
Bob,CS102,Dr.Smith,CompSci,StateU
Alice,CS101,Dr.Smith,CompSci,StateU
";

    fn sample_graph() -> CollegeGraph {
        let triples = extract_from_reader(DATA.as_bytes()).unwrap();
        CollegeGraph::from_triples(&triples)
    }

    #[test]
    fn test_one_node_per_label() {
        let graph = sample_graph();
        // Alice, Bob, CS101, CS102, Dr.Smith, CompSci, StateU
        assert_eq!(graph.node_count(), 7);
    }

    #[test]
    fn test_repeated_pairs_share_one_edge() {
        let graph = sample_graph();
        // Alice->CS101, CS101->Dr.Smith, Bob->CS102, CS102->Dr.Smith, Dr.Smith->CompSci, CompSci->StateU
        assert_eq!(graph.edge_count(), 6);

        let g = graph.graph();
        let alice = graph.index["Alice"];
        let cs101 = graph.index["CS101"];
        assert_eq!(g.edges_connecting(alice, cs101).count(), 1);

        let html = render_html(&graph).unwrap();
        assert_eq!(html.matches("\"from\":\"CompSci\",\"to\":\"StateU\"").count(), 1);
    }

    #[test]
    fn test_upsert_relation_last_write_wins() {
        let mut graph = CollegeGraph::new();
        let alice = graph.upsert_node("Alice", EntityType::Student);
        let cs101 = graph.upsert_node("CS101", EntityType::Course);

        let first = graph.upsert_relation(alice, cs101, "enrolled_in");
        let second = graph.upsert_relation(alice, cs101, "audits");
        assert_eq!(first, second);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.graph()[first].label, "audits");

        graph.upsert_relation(cs101, alice, "has_student");
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_node_attributes() {
        let graph = sample_graph();
        let node = graph.node("Alice").unwrap();

        assert_eq!(node.label, "Alice");
        assert_eq!(node.group, "Student");
        assert_eq!(node.color, "#00E5FF");
        assert_eq!(node.title, "<b>Alice</b><br>Type: Student");
        assert_eq!(node.size, 25);
        assert_eq!(graph.node("Dr.Smith").unwrap().color, "#FF5252");
    }

    #[test]
    fn test_upsert_last_write_wins() {
        let mut graph = CollegeGraph::new();
        let first = graph.upsert_node("Physics", EntityType::Course);
        let second = graph.upsert_node("Physics", EntityType::Department);

        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 1);
        let node = graph.node("Physics").unwrap();
        assert_eq!(node.group, "Department");
        assert_eq!(node.color, "#7C4DFF");
    }

    #[test]
    fn test_edge_direction_and_label() {
        let graph = sample_graph();
        let g = graph.graph();
        let edge = g.edge_references().next().unwrap();

        assert_eq!(g[edge.source()].id, "Alice");
        assert_eq!(g[edge.target()].id, "CS101");
        assert_eq!(edge.weight().label, "enrolled_in");
        assert_eq!(edge.weight().width, 2);
    }

    #[test]
    fn test_render_contains_controls_and_data() {
        let html = render_html(&sample_graph()).unwrap();

        for marker in ["control-panel", "searchNode", "filterNodes", "exportPNG"] {
            assert!(html.contains(marker), "missing {}", marker);
        }
        assert!(html.contains("\"from\":\"Alice\",\"to\":\"CS101\""));
        assert!(html.contains("\"solver\":\"forceAtlas2Based\""));
        assert!(html.contains("\"navigationButtons\":true"));
        assert!(html.contains("background-color: #0f172a"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_render_escapes_script_close() {
        let mut graph = CollegeGraph::new();
        graph.upsert_node("</script>", EntityType::Student);

        let html = render_html(&graph).unwrap();
        assert!(html.contains("<\\/script>"));
    }

    #[test]
    fn test_write_html_empty_graph() {
        let dir = tempfile::TempDir::new().unwrap();
        let triples = extract_from_reader(
            "Student,Course,Professor,Department,College\n".as_bytes(),
        )
        .unwrap();
        let graph = CollegeGraph::from_triples(&triples);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);

        let path = write_html(&graph, dir.path().join("college_graph.html")).unwrap();
        assert!(path.is_absolute());

        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("new vis.DataSet([])"));
        assert!(html.contains("exportPNG"));
    }

    #[test]
    fn test_write_html_unwritable_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = write_html(&sample_graph(), dir.path().join("missing").join("out.html")).unwrap_err();
        assert!(matches!(err, GraphError::Io(_)));
    }

    #[test]
    fn test_launch_browser_missing_command() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_html(&sample_graph(), dir.path().join("college_graph.html")).unwrap();

        let err = launch_browser(Command::new("no-such-browser-for-college-graph"), &path).unwrap_err();
        assert!(matches!(err, GraphError::Browser(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_create_college_graph_writes_and_launches() {
        let dir = tempfile::TempDir::new().unwrap();
        let triples = extract_from_reader(DATA.as_bytes()).unwrap();

        let path = create_college_graph_with(
            &triples,
            &dir.path().join("college_graph.html"),
            Command::new("true"),
        )
        .unwrap();
        assert!(path.is_absolute());
        assert!(path.exists());

        let html = fs::read_to_string(&path).unwrap();
        for marker in ["control-panel", "searchNode", "filterNodes", "exportPNG"] {
            assert!(html.contains(marker), "missing {}", marker);
        }
    }
}
