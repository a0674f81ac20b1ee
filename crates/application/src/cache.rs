use std::net::Ipv4Addr;

use rustc_hash::FxHashMap;
use tracing::debug;

use rootwalk_domain::{Question, RecordClass, RecordData, RecordType, ResourceRecord, RootHint};

/// The thirteen well-known root servers used when no hint override is
/// configured.
const ROOT_SERVERS: [(&str, Ipv4Addr); 13] = [
    ("a.root-servers.net", Ipv4Addr::new(198, 41, 0, 4)),
    ("b.root-servers.net", Ipv4Addr::new(170, 247, 170, 2)),
    ("c.root-servers.net", Ipv4Addr::new(192, 33, 4, 12)),
    ("d.root-servers.net", Ipv4Addr::new(199, 7, 91, 13)),
    ("e.root-servers.net", Ipv4Addr::new(192, 203, 230, 10)),
    ("f.root-servers.net", Ipv4Addr::new(192, 5, 5, 241)),
    ("g.root-servers.net", Ipv4Addr::new(192, 112, 36, 4)),
    ("h.root-servers.net", Ipv4Addr::new(198, 97, 190, 53)),
    ("i.root-servers.net", Ipv4Addr::new(192, 36, 148, 17)),
    ("j.root-servers.net", Ipv4Addr::new(192, 58, 128, 30)),
    ("k.root-servers.net", Ipv4Addr::new(193, 0, 14, 129)),
    ("l.root-servers.net", Ipv4Addr::new(199, 7, 83, 42)),
    ("m.root-servers.net", Ipv4Addr::new(202, 12, 27, 33)),
];

/// Process-lifetime record cache keyed by question.
///
/// Expiry is lazy: expired entries are dropped when the bucket they live in
/// is read, there is no background sweep. The cache is an explicit object
/// owned by the resolver that uses it; nothing here is global. It is only
/// touched from the single resolving thread — serving concurrent lookups
/// would need a locking discipline around the buckets.
pub struct RecordCache {
    entries: FxHashMap<Question, Vec<ResourceRecord>>,
    /// Permanent NS records for the root zone, the fallback of last resort
    /// for delegation lookups.
    root_hints: Vec<ResourceRecord>,
}

impl RecordCache {
    /// A cache seeded with the built-in root server hints.
    pub fn new() -> Self {
        let hints: Vec<RootHint> = ROOT_SERVERS
            .iter()
            .map(|(name, address)| RootHint {
                name: (*name).to_string(),
                address: *address,
            })
            .collect();
        Self::with_hints(&hints)
    }

    /// A cache seeded with the given root hints: a permanent NS record per
    /// hint for the root zone, plus a permanent A record for the hint's own
    /// name so the very first delegation lookup can always be bootstrapped.
    pub fn with_hints(hints: &[RootHint]) -> Self {
        let mut cache = Self {
            entries: FxHashMap::default(),
            root_hints: Vec::new(),
        };
        for hint in hints {
            cache.root_hints.push(ResourceRecord::permanent(
                Question::new("", RecordType::NS, RecordClass::IN),
                RecordData::Name(hint.name.to_ascii_lowercase()),
            ));
            cache.add_result(ResourceRecord::permanent(
                Question::new(&hint.name, RecordType::A, RecordClass::IN),
                RecordData::Ipv4(hint.address),
            ));
        }
        cache
    }

    /// Inserts a record into the bucket keyed by its question. Inserting a
    /// structurally equal record again is a no-op.
    pub fn add_result(&mut self, record: ResourceRecord) {
        let bucket = self.entries.entry(record.question.clone()).or_default();
        if !bucket.contains(&record) {
            bucket.push(record);
        }
    }

    /// Unexpired records answering the question. Expired entries found along
    /// the way are discarded. When the question has no live results of its
    /// own type, live CNAME records for the same name are returned instead,
    /// so callers see the alias they have to chase.
    pub fn cached_results(&mut self, question: &Question) -> Vec<ResourceRecord> {
        let live = self.live_records(question);
        if !live.is_empty() || question.record_type == RecordType::CNAME {
            return live;
        }
        let alias = Question::new(
            &question.host_name,
            RecordType::CNAME,
            question.record_class,
        );
        self.live_records(&alias)
    }

    /// The closest known delegation for the question: walks the name through
    /// every right-hand suffix down to the root and returns the first suffix
    /// with live NS (or CNAME) records, falling back to the root hints.
    pub fn best_nameservers(&mut self, question: &Question) -> Vec<ResourceRecord> {
        for suffix in suffixes(&question.host_name) {
            let ns_question = Question::new(suffix, RecordType::NS, question.record_class);
            let found = self.cached_results(&ns_question);
            if !found.is_empty() {
                debug!(zone = %ns_question.display_name(), servers = found.len(), "delegation from cache");
                return found;
            }
        }
        debug!("no cached delegation, using root hints");
        self.root_hints.clone()
    }

    fn live_records(&mut self, question: &Question) -> Vec<ResourceRecord> {
        match self.entries.get_mut(question) {
            Some(bucket) => {
                bucket.retain(|record| !record.is_expired());
                bucket.clone()
            }
            None => Vec::new(),
        }
    }
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterates a domain name and each of its right-hand suffixes, ending with
/// the root (empty string): `www.cs.example.org`, `cs.example.org`,
/// `example.org`, `org`, ``.
fn suffixes(name: &str) -> impl Iterator<Item = &str> {
    let mut next = Some(name);
    std::iter::from_fn(move || {
        let current = next?;
        next = match current.find('.') {
            Some(dot) => Some(&current[dot + 1..]),
            None if current.is_empty() => None,
            None => Some(""),
        };
        Some(current)
    })
}
