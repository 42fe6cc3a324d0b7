use crate::Distribution;
use algograph::graph::*;

pub trait PageRank {
    type Result: PageRankResult;

    fn calc(&self, start: &Distribution) -> crate::Result<Self::Result>;
}

pub trait PageRankResult {
    fn page_rank(&self) -> &Distribution;
    fn debug<'a, G: QueryableGraph>(&'a self, graph: &'a G) -> impl std::fmt::Debug + 'a;
}
