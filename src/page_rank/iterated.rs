use super::*;
use crate::common::full_start;
use crate::*;
use algograph::graph::{QueryableGraph, VertexId};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

pub const DEFAULT_EPSILON: f64 = 0.001;
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

pub struct IteratedPageRank<'a, G>
where
    G: QueryableGraph,
{
    model: TransitionModel<'a, G>,
    epsilon: f64,
    max_iterations: usize,
    transitions: BTreeMap<(VertexId, VertexId), f64>,
    dangling: Vec<VertexId>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub damping: f64,
    pub epsilon: f64,
    pub max_iterations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            epsilon: DEFAULT_EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Result {
    pub page_rank: Distribution,
    pub delta: Distribution,
    pub iterations: usize,
}

impl<'a, G: QueryableGraph> IteratedPageRank<'a, G> {
    pub fn new(g: &'a G, config: &Config) -> crate::Result<Self> {
        let epsilon = config.epsilon;
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(Error::InvalidInput(format!("epsilon={epsilon}")));
        }
        if config.max_iterations == 0 {
            return Err(Error::InvalidInput(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        let model = TransitionModel::new(g, config.damping)?;
        let damping = model.damping();
        let mut transitions = BTreeMap::new();
        let mut dangling = vec![];
        for u in model.vertices().iter() {
            match model.successors(u) {
                Some(sinks) if !sinks.is_empty() => {
                    let unit = damping / (sinks.len() as f64);
                    for v in sinks.iter() {
                        transitions.insert((*u, *v), unit);
                    }
                }
                _ => dangling.push(*u),
            }
        }
        Ok(Self {
            model,
            epsilon,
            max_iterations: config.max_iterations,
            transitions,
            dangling,
        })
    }

    pub fn model(&self) -> &TransitionModel<'a, G> {
        &self.model
    }

    pub fn calc_uniform(&self) -> crate::Result<self::Result> {
        self.calc(&uniform(self.model.graph()))
    }

    /// Vertices missing from `p` carry no mass.
    pub fn step(&self, p: &Distribution) -> Distribution {
        let vertices = self.model.vertices();
        let n = vertices.len() as f64;
        let damping = self.model.damping();
        let mass = |v: &VertexId| p.get(v).copied().unwrap_or(0.0);

        // a dangling vertex spreads its mass over every vertex, itself included
        let dangling_mass: f64 = self.dangling.iter().map(&mass).sum();
        let base = (1.0 - damping) / n + damping * dangling_mass / n;

        let mut r = HashMap::with_capacity_and_hasher(vertices.len(), ahash::RandomState::new());
        for v in vertices.iter() {
            r.insert(*v, base);
        }
        for ((u, v), w) in self.transitions.iter() {
            if let Some(to) = r.get_mut(v) {
                *to += mass(u) * w;
            }
        }
        r
    }
}

impl<G: QueryableGraph> PageRank for IteratedPageRank<'_, G> {
    type Result = self::Result;

    fn calc(&self, start: &Distribution) -> crate::Result<Self::Result> {
        let vertices = self.model.vertices();
        let mut p = full_start(self.model.graph(), vertices, start)?;
        for iterations in 1..=self.max_iterations {
            let r = self.step(&p);
            let delta: Distribution = vertices
                .iter()
                .map(|v| {
                    let a = p.get(v).copied().unwrap_or(0.0);
                    let b = r.get(v).copied().unwrap_or(0.0);
                    (*v, a - b)
                })
                .collect();
            let change = norm_inf(&delta);
            debug!(iterations, change, "page rank iteration");

            if change < self.epsilon {
                info!(iterations, epsilon = self.epsilon, "page rank converged");
                return Ok(Self::Result {
                    page_rank: r,
                    delta,
                    iterations,
                });
            }

            p = r;
        }
        warn!(
            max_iterations = self.max_iterations,
            "page rank did not converge"
        );
        Err(Error::Internal(format!(
            "page rank did not converge within {} iterations",
            self.max_iterations
        )))
    }
}

impl PageRankResult for self::Result {
    fn page_rank(&self) -> &Distribution {
        &self.page_rank
    }

    fn debug<'a, G: QueryableGraph>(&'a self, graph: &'a G) -> impl std::fmt::Debug + 'a {
        ResultDebug {
            graph,
            result: self,
        }
    }
}

pub struct ResultDebug<'a, G: QueryableGraph> {
    graph: &'a G,
    result: &'a self::Result,
}

impl<G: QueryableGraph> std::fmt::Debug for ResultDebug<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "after {} iterations", self.result.iterations)?;
        for v in sorted_vertices(self.graph) {
            let p = self.result.page_rank.get(&v);
            let d = self.result.delta.get(&v);
            writeln!(f, "{v:?}: {p:?}, {d:?}")?;
        }
        Ok(())
    }
}
