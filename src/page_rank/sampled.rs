use super::*;
use crate::common::full_start;
use crate::*;
use algograph::graph::{QueryableGraph, VertexId};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::collections::HashMap;
use tracing::{debug, info};

pub const DEFAULT_SAMPLES: usize = 10_000;

pub struct SampledPageRank<'a, G>
where
    G: QueryableGraph,
{
    model: TransitionModel<'a, G>,
    samples: usize,
    seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub damping: f64,
    pub samples: usize,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            samples: DEFAULT_SAMPLES,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Result {
    pub page_rank: Distribution,
    pub visits: HashMap<VertexId, usize, ahash::RandomState>,
    pub samples: usize,
}

impl<'a, G: QueryableGraph> SampledPageRank<'a, G> {
    pub fn new(g: &'a G, config: &Config) -> crate::Result<Self> {
        if config.samples == 0 {
            return Err(Error::InvalidInput(
                "samples must be at least 1".to_string(),
            ));
        }
        let model = TransitionModel::new(g, config.damping)?;
        Ok(Self {
            model,
            samples: config.samples,
            seed: config.seed,
        })
    }

    pub fn model(&self) -> &TransitionModel<'a, G> {
        &self.model
    }

    pub fn calc_uniform(&self) -> crate::Result<self::Result> {
        self.calc(&uniform(self.model.graph()))
    }

    pub fn calc_with_rng<R: Rng>(
        &self,
        start: &Distribution,
        rng: &mut R,
    ) -> crate::Result<self::Result> {
        let vertices = self.model.vertices();
        let start = full_start(self.model.graph(), vertices, start)?;
        let mut cur = self.draw(
            vertices
                .iter()
                .map(|v| (*v, start.get(v).copied().unwrap_or(0.0))),
            rng,
        )?;

        let mut visits: HashMap<_, _, ahash::RandomState> =
            vertices.iter().map(|v| (*v, 0usize)).collect();
        for _ in 0..self.samples {
            if let Some(x) = visits.get_mut(&cur) {
                *x += 1;
            }
            cur = self.draw(self.model.weights(&cur)?, rng)?;
        }

        let n = self.samples as f64;
        let page_rank: Distribution = vertices
            .iter()
            .map(|v| {
                let k = visits.get(v).copied().unwrap_or(0);
                (*v, k as f64 / n)
            })
            .collect();
        info!(samples = self.samples, "page rank sampled");
        Ok(self::Result {
            page_rank,
            visits,
            samples: self.samples,
        })
    }

    fn draw<I, R>(&self, weights: I, rng: &mut R) -> crate::Result<VertexId>
    where
        I: IntoIterator<Item = (VertexId, f64)>,
        R: Rng,
    {
        let x: f64 = rng.random();
        pick(weights, x)
            .ok_or_else(|| Error::Internal("drew from a distribution without mass".to_string()))
    }
}

impl<G: QueryableGraph> PageRank for SampledPageRank<'_, G> {
    type Result = self::Result;

    fn calc(&self, start: &Distribution) -> crate::Result<Self::Result> {
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        debug!(seed = ?self.seed, samples = self.samples, "sampling page rank");
        self.calc_with_rng(start, &mut rng)
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
        writeln!(f, "over {} samples", self.result.samples)?;
        for v in sorted_vertices(self.graph) {
            let p = self.result.page_rank.get(&v);
            let k = self.result.visits.get(&v);
            writeln!(f, "{v:?}: {p:?}, {k:?}")?;
        }
        Ok(())
    }
}
