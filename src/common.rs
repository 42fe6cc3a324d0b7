use crate::{Error, Result};
use algograph::graph::*;
use std::collections::HashMap;

pub type Distribution = HashMap<VertexId, f64, ahash::RandomState>;

pub const DEFAULT_DAMPING: f64 = 0.85;

pub fn norm_1(v: &Distribution) -> f64 {
    v.values().map(|x| x.abs()).sum()
}

pub fn norm_inf(v: &Distribution) -> f64 {
    v.values().map(|x| x.abs()).fold(0.0, f64::max)
}

pub fn uniform<G: QueryableGraph>(graph: &G) -> Distribution {
    let n = graph.vertex_size() as f64;
    graph.iter_vertices().map(|v| (v, 1.0 / n)).collect()
}

/// Ascending id order. Floating-point sums walk vertices in this order so
/// results do not depend on hash seeds.
pub fn sorted_vertices<G: QueryableGraph>(graph: &G) -> Vec<VertexId> {
    let mut vs: Vec<_> = graph.iter_vertices().collect();
    vs.sort();
    vs
}

/// First vertex whose cumulative weight exceeds `x`; the last weighted one if rounding falls short.
pub fn pick<I>(weights: I, x: f64) -> Option<VertexId>
where
    I: IntoIterator<Item = (VertexId, f64)>,
{
    let mut acc = 0.0;
    let mut last = None;
    for (v, w) in weights {
        acc += w;
        if acc > x {
            return Some(v);
        }
        if w > 0.0 {
            last = Some(v);
        }
    }
    last
}

pub(crate) fn check_damping(damping: f64) -> Result<()> {
    if damping > 0.0 && damping < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "damping must lie in (0, 1), got {damping}"
        )))
    }
}

pub(crate) fn full_start<G: QueryableGraph>(
    graph: &G,
    vertices: &[VertexId],
    start: &Distribution,
) -> Result<Distribution> {
    for (v, w) in start.iter() {
        if !graph.contains_vertex(v) {
            return Err(Error::InvalidInput(format!(
                "start distribution refers to unknown vertex {v:?}"
            )));
        }
        if !w.is_finite() || *w < 0.0 {
            return Err(Error::InvalidInput(format!(
                "start distribution has weight {w} on {v:?}"
            )));
        }
    }
    let mut p = HashMap::with_capacity_and_hasher(vertices.len(), ahash::RandomState::new());
    let mut p_sum = 0.0;
    for v in vertices.iter() {
        let w = start.get(v).copied().unwrap_or(0.0);
        p_sum += w;
        p.insert(*v, w);
    }
    if (p_sum - 1.0).abs() > 1e-7 {
        return Err(Error::InvalidInput(format!(
            "start distribution sums to {p_sum}"
        )));
    }
    Ok(p)
}
