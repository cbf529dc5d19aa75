//! Editing operations over a [`ShaderGraph`]: node creation and removal, and
//! connection management.
//!
//! These are the operations the interactive editing surface drives. The
//! compiler itself never mutates the graph; a pass borrows it immutably for
//! its whole duration.

use anyhow::{Result, anyhow, bail};

use crate::dsl::{Connection, Endpoint, Node, NodeKind, ShaderGraph};

/// Add a node of the given kind, assigning a fresh id from the graph's stored
/// counter. Returns the new node's id.
pub fn add_node(graph: &mut ShaderGraph, kind: NodeKind) -> String {
    loop {
        graph.next_node_id += 1;
        let id = graph.next_node_id.to_string();
        // Hand-written graphs may already use numeric ids; skip those.
        if graph.nodes.iter().all(|n| n.id != id) {
            graph.nodes.push(Node {
                id: id.clone(),
                kind,
            });
            return id;
        }
    }
}

/// Connect `from_node.from_port` to `to_node.to_port`.
///
/// Each input port accepts at most one incoming connection; connecting to an
/// occupied port replaces the prior connection.
pub fn connect(
    graph: &mut ShaderGraph,
    from_node: &str,
    from_port: &str,
    to_node: &str,
    to_port: &str,
) -> Result<()> {
    let from = node_by_id(graph, from_node)?;
    if !from.kind.output_ports().contains(&from_port) {
        bail!(
            "node {from_node} ({}) has no output port {from_port}",
            from.kind.name()
        );
    }
    let to = node_by_id(graph, to_node)?;
    if !to.kind.input_ports().contains(&to_port) {
        bail!(
            "node {to_node} ({}) has no input port {to_port}",
            to.kind.name()
        );
    }

    graph
        .connections
        .retain(|c| !(c.to.node_id == to_node && c.to.port_id == to_port));
    graph.connections.push(Connection {
        id: format!("{from_node}_{to_node}_{to_port}"),
        from: Endpoint {
            node_id: from_node.to_string(),
            port_id: from_port.to_string(),
        },
        to: Endpoint {
            node_id: to_node.to_string(),
            port_id: to_port.to_string(),
        },
    });
    Ok(())
}

/// Remove the connection (if any) feeding `to_node.to_port`. Returns whether
/// a connection was removed.
pub fn disconnect(graph: &mut ShaderGraph, to_node: &str, to_port: &str) -> bool {
    let before = graph.connections.len();
    graph
        .connections
        .retain(|c| !(c.to.node_id == to_node && c.to.port_id == to_port));
    graph.connections.len() != before
}

/// Remove a node and every connection touching it.
pub fn remove_node(graph: &mut ShaderGraph, node_id: &str) -> Result<()> {
    let before = graph.nodes.len();
    graph.nodes.retain(|n| n.id != node_id);
    if graph.nodes.len() == before {
        bail!("node not found: {node_id}");
    }
    graph
        .connections
        .retain(|c| c.from.node_id != node_id && c.to.node_id != node_id);
    Ok(())
}

fn node_by_id<'a>(graph: &'a ShaderGraph, node_id: &str) -> Result<&'a Node> {
    graph
        .nodes
        .iter()
        .find(|n| n.id == node_id)
        .ok_or_else(|| anyhow!("node not found: {node_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{BlendParams, ColorParams};

    #[test]
    fn add_node_assigns_sequential_ids() {
        let mut graph = ShaderGraph::new("t");
        let a = add_node(&mut graph, NodeKind::Color(ColorParams::default()));
        let b = add_node(&mut graph, NodeKind::Add);
        assert_eq!(a, "1");
        assert_eq!(b, "2");
        assert_eq!(graph.next_node_id, 2);
    }

    #[test]
    fn add_node_skips_ids_already_in_use() {
        let mut graph = ShaderGraph::new("t");
        graph.nodes.push(Node {
            id: "1".to_string(),
            kind: NodeKind::Uv,
        });
        let id = add_node(&mut graph, NodeKind::Add);
        assert_eq!(id, "2");
    }

    #[test]
    fn connecting_an_occupied_input_replaces_the_prior_connection() {
        let mut graph = ShaderGraph::new("t");
        let c1 = add_node(&mut graph, NodeKind::Color(ColorParams::default()));
        let c2 = add_node(&mut graph, NodeKind::Color(ColorParams::default()));
        let blend = add_node(&mut graph, NodeKind::Blend(BlendParams::default()));

        connect(&mut graph, &c1, "Color", &blend, "Color A").unwrap();
        connect(&mut graph, &c2, "Color", &blend, "Color A").unwrap();

        let incoming: Vec<&Connection> = graph
            .connections
            .iter()
            .filter(|c| c.to.node_id == blend && c.to.port_id == "Color A")
            .collect();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].from.node_id, c2);
    }

    #[test]
    fn connect_rejects_unknown_ports() {
        let mut graph = ShaderGraph::new("t");
        let c = add_node(&mut graph, NodeKind::Color(ColorParams::default()));
        let a = add_node(&mut graph, NodeKind::Add);

        let err = connect(&mut graph, &c, "Output", &a, "A").unwrap_err();
        assert!(err.to_string().contains("no output port"));

        let err = connect(&mut graph, &c, "Color", &a, "C").unwrap_err();
        assert!(err.to_string().contains("no input port"));
    }

    #[test]
    fn remove_node_drops_touching_connections() {
        let mut graph = ShaderGraph::new("t");
        let c = add_node(&mut graph, NodeKind::Color(ColorParams::default()));
        let add = add_node(&mut graph, NodeKind::Add);
        connect(&mut graph, &c, "Color", &add, "A").unwrap();
        connect(&mut graph, &c, "Color", &add, "B").unwrap();

        remove_node(&mut graph, &c).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.connections.is_empty());
        assert!(remove_node(&mut graph, &c).is_err());
    }

    #[test]
    fn disconnect_reports_whether_anything_was_removed() {
        let mut graph = ShaderGraph::new("t");
        let c = add_node(&mut graph, NodeKind::Color(ColorParams::default()));
        let add = add_node(&mut graph, NodeKind::Add);
        connect(&mut graph, &c, "Color", &add, "A").unwrap();

        assert!(disconnect(&mut graph, &add, "A"));
        assert!(!disconnect(&mut graph, &add, "A"));
    }
}
