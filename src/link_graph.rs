use crate::page_rank::{
    iterated::{self, IteratedPageRank},
    sampled::{self, SampledPageRank},
    PageRankResult,
};
use crate::*;
use algograph::graph::{directed, GrowableGraph, QueryableGraph, VertexId};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt::Debug,
};
use tracing::debug;

// vertices are created in ascending page order
#[derive(Debug, Clone)]
pub struct LinkGraph<P> {
    graph: directed::TreeBackedGraph,
    vertices: BTreeMap<P, VertexId>,
    pages: HashMap<VertexId, P, ahash::RandomState>,
}

impl<P: Ord + Clone + Debug> LinkGraph<P> {
    pub fn new<I, L>(links: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, L)>,
        L: IntoIterator<Item = P>,
    {
        let links = merge(links);
        for (page, sinks) in links.iter() {
            for sink in sinks.iter() {
                if sink == page {
                    return Err(Error::InvalidInput(format!("{page:?} links to itself")));
                }
                if !links.contains_key(sink) {
                    return Err(Error::InvalidInput(format!(
                        "{page:?} links to {sink:?}, which is not in the corpus"
                    )));
                }
            }
        }
        Ok(Self::build(links))
    }

    pub fn pruned<I, L>(links: I) -> Self
    where
        I: IntoIterator<Item = (P, L)>,
        L: IntoIterator<Item = P>,
    {
        let mut links = merge(links);
        let corpus: BTreeSet<P> = links.keys().cloned().collect();
        let mut dropped = 0;
        for (page, sinks) in links.iter_mut() {
            let before = sinks.len();
            sinks.retain(|sink| sink != page && corpus.contains(sink));
            dropped += before - sinks.len();
        }
        if dropped > 0 {
            debug!(dropped, "dropped self links and links leaving the corpus");
        }
        Self::build(links)
    }

    fn build(links: BTreeMap<P, BTreeSet<P>>) -> Self {
        let mut graph = directed::TreeBackedGraph::new();
        let mut vertices = BTreeMap::new();
        let mut pages = HashMap::with_capacity_and_hasher(links.len(), ahash::RandomState::new());
        for page in links.keys() {
            let v = graph.add_vertex();
            vertices.insert(page.clone(), v);
            pages.insert(v, page.clone());
        }
        for (page, sinks) in links.iter() {
            let Some(u) = vertices.get(page).copied() else {
                continue;
            };
            for sink in sinks.iter() {
                if let Some(v) = vertices.get(sink) {
                    graph.add_edge(u, *v);
                }
            }
        }
        Self {
            graph,
            vertices,
            pages,
        }
    }

    pub fn graph(&self) -> &directed::TreeBackedGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, page: &P) -> Option<VertexId> {
        self.vertices.get(page).copied()
    }

    pub fn page(&self, v: &VertexId) -> Option<&P> {
        self.pages.get(v)
    }

    pub fn pages(&self) -> impl Iterator<Item = &P> + '_ {
        self.vertices.keys()
    }

    pub fn successors(&self, page: &P) -> Option<BTreeSet<&P>> {
        let u = self.vertices.get(page)?;
        Some(
            self.graph
                .out_edges(u)
                .filter_map(|e| self.pages.get(&e.sink))
                .collect(),
        )
    }

    pub fn label(&self, p: &Distribution) -> BTreeMap<P, f64> {
        self.vertices
            .iter()
            .map(|(page, v)| (page.clone(), p.get(v).copied().unwrap_or(0.0)))
            .collect()
    }

    pub fn transition(&self, page: &P, damping: f64) -> Result<BTreeMap<P, f64>> {
        let v = self.vertex(page).ok_or_else(|| {
            Error::InvalidInput(format!("{page:?} is not in the corpus"))
        })?;
        let t = crate::page_rank::transition(&self.graph, &v, damping)?;
        Ok(self.label(&t))
    }

    pub fn sample(&self, config: &sampled::Config) -> Result<BTreeMap<P, f64>> {
        let res = SampledPageRank::new(&self.graph, config)?.calc_uniform()?;
        Ok(self.label(res.page_rank()))
    }

    pub fn iterate(&self, config: &iterated::Config) -> Result<BTreeMap<P, f64>> {
        let res = IteratedPageRank::new(&self.graph, config)?.calc_uniform()?;
        Ok(self.label(res.page_rank()))
    }
}

fn merge<P, I, L>(links: I) -> BTreeMap<P, BTreeSet<P>>
where
    P: Ord,
    I: IntoIterator<Item = (P, L)>,
    L: IntoIterator<Item = P>,
{
    let mut res: BTreeMap<P, BTreeSet<P>> = BTreeMap::new();
    for (page, sinks) in links {
        res.entry(page).or_default().extend(sinks);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cycle() -> LinkGraph<&'static str> {
        LinkGraph::new([("a", vec!["b"]), ("b", vec!["a"])]).unwrap()
    }

    #[test]
    fn builds_lookups() {
        let g = LinkGraph::new([
            ("1.html", vec!["2.html"]),
            ("2.html", vec!["1.html", "3.html"]),
            ("3.html", vec![]),
        ])
        .unwrap();
        assert_eq!(g.len(), 3);
        assert!(!g.is_empty());
        assert_eq!(g.graph().vertex_size(), 3);
        assert_eq!(g.graph().edge_size(), 3);

        let pages: Vec<_> = g.pages().copied().collect();
        assert_eq!(pages, vec!["1.html", "2.html", "3.html"]);
        for page in pages.iter() {
            let v = g.vertex(page).unwrap();
            assert_eq!(g.page(&v), Some(page));
        }

        let succ = g.successors(&"2.html").unwrap();
        assert_eq!(succ.into_iter().copied().collect::<Vec<_>>(), vec!["1.html", "3.html"]);
        assert!(g.successors(&"3.html").unwrap().is_empty());
        assert!(g.successors(&"4.html").is_none());
        assert!(g.vertex(&"4.html").is_none());
    }

    #[test]
    fn repeated_pages_merge() {
        let g = LinkGraph::new([("a", vec!["b"]), ("b", vec![]), ("a", vec!["c", "b"]), ("c", vec![])])
            .unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.successors(&"a").unwrap().len(), 2);
        assert_eq!(g.graph().edge_size(), 2);
    }

    #[test]
    fn strict_rejects_bad_links() {
        assert!(matches!(
            LinkGraph::new([("a", vec!["a"])]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            LinkGraph::new([("a", vec!["b"])]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn pruned_drops_bad_links() {
        let g = LinkGraph::pruned([
            ("a", vec!["a", "b", "https://example.com"]),
            ("b", vec!["c"]),
        ]);
        assert_eq!(g.len(), 2);
        assert_eq!(
            g.successors(&"a").unwrap().into_iter().copied().collect::<Vec<_>>(),
            vec!["b"]
        );
        assert!(g.successors(&"b").unwrap().is_empty());
    }

    #[test]
    fn two_cycle_ranks() {
        let g = two_cycle();
        let ranks = g.iterate(&iterated::Config::default()).unwrap();
        assert!((ranks["a"] - 0.5).abs() < 1e-12, "{ranks:?}");
        assert!((ranks["b"] - 0.5).abs() < 1e-12, "{ranks:?}");

        let cfg = sampled::Config {
            seed: Some(3407),
            ..sampled::Config::default()
        };
        let ranks = g.sample(&cfg).unwrap();
        assert!((ranks["a"] - 0.5).abs() < 0.05, "{ranks:?}");
        assert!((ranks.values().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_page() {
        let g = LinkGraph::new([("only", Vec::<&str>::new())]).unwrap();
        let ranks = g.iterate(&iterated::Config::default()).unwrap();
        assert!((ranks["only"] - 1.0).abs() < 1e-12);
        for samples in [1, 10, 10_000] {
            let cfg = sampled::Config {
                samples,
                ..sampled::Config::default()
            };
            let ranks = g.sample(&cfg).unwrap();
            assert_eq!(ranks["only"], 1.0);
        }
    }

    #[test]
    fn dangling_pair() {
        let g = LinkGraph::new([("a", vec![]), ("b", vec!["a"])]).unwrap();
        let ranks = g.iterate(&iterated::Config::default()).unwrap();
        assert!((ranks["a"] - 0.925 / 1.425).abs() < 1e-3, "{ranks:?}");
        assert!(ranks["a"] > ranks["b"]);
    }

    #[test]
    fn labelled_transition() {
        let g = LinkGraph::new([("a", vec!["b"]), ("b", vec![]), ("c", vec!["a", "b"])]).unwrap();
        let t = g.transition(&"b", 0.85).unwrap();
        assert_eq!(t.len(), 3);
        assert!(t.values().all(|w| *w == 1.0 / 3.0));

        let t = g.transition(&"a", 0.85).unwrap();
        assert!((t["b"] - (0.85 + 0.05)).abs() < 1e-12, "{t:?}");
        assert!((t["a"] - 0.05).abs() < 1e-12, "{t:?}");
        assert!((t["c"] - 0.05).abs() < 1e-12, "{t:?}");

        assert!(matches!(
            g.transition(&"z", 0.85),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_corpus() {
        let g = LinkGraph::<String>::new(Vec::<(String, Vec<String>)>::new()).unwrap();
        assert!(g.is_empty());
        assert!(matches!(
            g.iterate(&iterated::Config::default()),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            g.sample(&sampled::Config::default()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn label_fills_gaps() {
        let g = two_cycle();
        let v = g.vertex(&"a").unwrap();
        let p: Distribution = [(v, 1.0)].into_iter().collect();
        let labelled = g.label(&p);
        assert_eq!(labelled["a"], 1.0);
        assert_eq!(labelled["b"], 0.0);
    }
}
