use crate::*;
use algograph::graph::{directed, GrowableGraph, VertexId};
use quickcheck::Arbitrary;

pub fn graph_of(n: usize, links: &[(usize, usize)]) -> (directed::TreeBackedGraph, Vec<VertexId>) {
    let mut g = directed::TreeBackedGraph::new();
    let vs: Vec<_> = (0..n).map(|_| g.add_vertex()).collect();
    for (u, v) in links.iter() {
        g.add_edge(vs[*u], vs[*v]);
    }
    (g, vs)
}

pub fn total(p: &Distribution) -> f64 {
    let mut vs: Vec<_> = p.keys().copied().collect();
    vs.sort();
    vs.iter().map(|v| p[v]).sum()
}

#[derive(Debug, Clone)]
pub struct RandomGraph {
    pub graph: directed::TreeBackedGraph,
    pub damping: f64,
}

impl Arbitrary for RandomGraph {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        const N: usize = 10;

        let n: usize = usize::arbitrary(g) % N + 1;
        let mut graph = directed::TreeBackedGraph::new();
        let vertices: Vec<_> = (0..n).map(|_| graph.add_vertex()).collect();
        for _ in 0..(n * 2) {
            let v0 = vertices[usize::arbitrary(g) % vertices.len()];
            let v1 = vertices[usize::arbitrary(g) % vertices.len()];
            if v0 != v1 {
                graph.add_edge(v0, v1);
            }
        }
        // somewhere in [0.05, 0.95]
        let damping = 0.05 + f64::from(u8::arbitrary(g) % 91) / 100.0;
        Self { graph, damping }
    }
}
