use crate::common::check_damping;
use crate::*;
use algograph::graph::{QueryableGraph, VertexId};
use std::collections::{BTreeSet, HashMap};

pub struct TransitionModel<'a, G>
where
    G: QueryableGraph,
{
    graph: &'a G,
    damping: f64,
    vertices: Vec<VertexId>,
    successors: HashMap<VertexId, BTreeSet<VertexId>, ahash::RandomState>,
}

impl<'a, G: QueryableGraph> TransitionModel<'a, G> {
    pub fn new(g: &'a G, damping: f64) -> Result<Self> {
        check_damping(damping)?;
        if g.vertex_size() == 0 {
            return Err(Error::InvalidInput("graph has no pages".to_string()));
        }
        let vertices = sorted_vertices(g);
        let mut successors =
            HashMap::with_capacity_and_hasher(vertices.len(), ahash::RandomState::new());
        for u in vertices.iter() {
            successors.insert(*u, successors_of(g, u)?);
        }
        Ok(Self {
            graph: g,
            damping,
            vertices,
            successors,
        })
    }

    pub fn graph(&self) -> &'a G {
        self.graph
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn successors(&self, u: &VertexId) -> Option<&BTreeSet<VertexId>> {
        self.successors.get(u)
    }

    pub fn is_dangling(&self, u: &VertexId) -> bool {
        self.successors.get(u).is_some_and(|xs| xs.is_empty())
    }

    pub fn transition(&self, page: &VertexId) -> Result<Distribution> {
        let mut res = HashMap::with_capacity_and_hasher(self.vertices.len(), ahash::RandomState::new());
        for (v, w) in self.weights(page)? {
            res.insert(v, w);
        }
        Ok(res)
    }

    pub fn weights(
        &self,
        page: &VertexId,
    ) -> Result<impl Iterator<Item = (VertexId, f64)> + '_> {
        let sinks = self.successors.get(page).ok_or_else(|| {
            Error::InvalidInput(format!("{page:?} is not a page of the graph"))
        })?;
        let (teleport, link) = row(self.vertices.len(), sinks.len(), self.damping);
        Ok(self.vertices.iter().map(move |v| {
            if sinks.contains(v) {
                (*v, teleport + link)
            } else {
                (*v, teleport)
            }
        }))
    }
}

/// Validates only `page` and its own links.
pub fn transition<G: QueryableGraph>(
    graph: &G,
    page: &VertexId,
    damping: f64,
) -> Result<Distribution> {
    check_damping(damping)?;
    if graph.vertex_size() == 0 {
        return Err(Error::InvalidInput("graph has no pages".to_string()));
    }
    if !graph.contains_vertex(page) {
        return Err(Error::InvalidInput(format!(
            "{page:?} is not a page of the graph"
        )));
    }
    let sinks = successors_of(graph, page)?;
    let (teleport, link) = row(graph.vertex_size(), sinks.len(), damping);
    Ok(graph
        .iter_vertices()
        .map(|v| {
            if sinks.contains(&v) {
                (v, teleport + link)
            } else {
                (v, teleport)
            }
        })
        .collect())
}

// parallel edges collapse into one link
fn successors_of<G: QueryableGraph>(g: &G, u: &VertexId) -> Result<BTreeSet<VertexId>> {
    let mut sinks = BTreeSet::new();
    for e in g.out_edges(u) {
        if e.sink == *u {
            return Err(Error::InvalidInput(format!("{u:?} links to itself")));
        }
        if !g.contains_vertex(&e.sink) {
            return Err(Error::InvalidInput(format!(
                "{u:?} links to {:?}, which is not in the graph",
                e.sink
            )));
        }
        sinks.insert(e.sink);
    }
    Ok(sinks)
}

fn row(n: usize, out: usize, damping: f64) -> (f64, f64) {
    let n = n as f64;
    if out == 0 {
        (1.0 / n, 0.0)
    } else {
        ((1.0 - damping) / n, damping / (out as f64))
    }
}
