/// Diagnostic counters for the dictionary's lookup path: a small direct
/// mapped cache sits in front of the bucket chain so repeated lookups of
/// the same string avoid walking the chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DictCounters {
    pub bucket_search_miss: u64,
    pub bucket_search_hit: u64,
    pub bucket_cache_search_miss: u64,
    pub bucket_cache_search_hit: u64,
}

impl DictCounters {
    pub fn reset(&mut self) {
        *self = DictCounters::default();
    }
}
