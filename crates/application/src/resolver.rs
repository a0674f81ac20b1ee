use std::net::Ipv4Addr;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::debug;

use rootwalk_domain::{
    LookupError, Message, Question, RecordClass, RecordType, ResourceRecord, Section,
};

use crate::cache::RecordCache;
use crate::ports::{DnsTransport, QueryObserver};

/// The iterative resolution engine.
///
/// Owns the cache and the transport for the lifetime of the service; a
/// lookup occupies the calling thread until it completes, including the
/// nested sub-resolutions for CNAME targets and nameserver addresses.
pub struct Resolver<T: DnsTransport> {
    cache: RecordCache,
    transport: T,
    observer: Arc<dyn QueryObserver>,
}

impl<T: DnsTransport> Resolver<T> {
    pub fn new(cache: RecordCache, transport: T, observer: Arc<dyn QueryObserver>) -> Self {
        Self {
            cache,
            transport,
            observer,
        }
    }

    /// Answers a question, chasing CNAME aliases up to `max_indirection`
    /// levels deep.
    ///
    /// A negative budget fails with [`LookupError::IndirectionLimit`] before
    /// any network activity. When the direct result already answers the
    /// exact question it is returned unmodified; otherwise every CNAME in it
    /// is resolved recursively as (target, original type, original class)
    /// with a decremented budget, and the deduplicated union of everything
    /// traversed is returned.
    pub fn resolve(
        &mut self,
        question: &Question,
        max_indirection: i32,
    ) -> Result<Vec<ResourceRecord>, LookupError> {
        if max_indirection < 0 {
            return Err(LookupError::IndirectionLimit);
        }

        let direct = self.iterative_query(question)?;
        if contains_answer(&direct, question) {
            return Ok(direct);
        }

        let mut results = Vec::new();
        for record in direct {
            let alias = match record.record_type() {
                RecordType::CNAME => record.name_target().map(str::to_owned),
                _ => None,
            };
            push_unique(&mut results, record);

            if let Some(target) = alias {
                let chased = self.resolve(
                    &Question::new(&target, question.record_type, question.record_class),
                    max_indirection - 1,
                )?;
                for record in chased {
                    push_unique(&mut results, record);
                }
            }
        }
        Ok(results)
    }

    /// Answers one question iteratively, without chasing aliases.
    ///
    /// A cache hit returns immediately. Otherwise the engine walks the
    /// delegation hierarchy: candidates come from the closest cached
    /// delegation, every response is merged into the cache, a productive hop
    /// re-selects candidates from the now-deeper cache while parking the
    /// untried siblings in a backlog, and servers already queried in this
    /// resolution are never queried again. The loop ends with an answer, a
    /// CNAME for the exact name (handed back for the caller to chase), an
    /// explicit server error, or an empty result once every known server has
    /// been tried.
    pub fn iterative_query(
        &mut self,
        question: &Question,
    ) -> Result<Vec<ResourceRecord>, LookupError> {
        let cached = self.cache.cached_results(question);
        if !cached.is_empty() {
            debug!(question = %question, results = cached.len(), "answered from cache");
            return Ok(cached);
        }

        let mut answer: Vec<ResourceRecord> = Vec::new();
        let mut tried: FxHashSet<Ipv4Addr> = FxHashSet::default();
        let mut candidates = self.cache.best_nameservers(question);
        let mut backlog: Vec<ResourceRecord> = Vec::new();

        loop {
            if candidates.is_empty() {
                if backlog.is_empty() {
                    debug!(question = %question, "every known server tried, giving up");
                    return Ok(answer);
                }
                candidates.append(&mut backlog);
                continue;
            }

            for record in &candidates {
                self.cache.add_result(record.clone());
            }
            let cached = self.cache.cached_results(question);
            if !cached.is_empty() {
                return Ok(cached);
            }

            let current = candidates.remove(0);
            let server = match current.record_type() {
                // The queried name is an alias: stop here and let the
                // CNAME-chasing caller take over with its budget.
                RecordType::CNAME if current.host_name() == question.host_name => {
                    push_unique(&mut answer, current);
                    return Ok(answer);
                }
                // Glue: an address candidate is usable as-is.
                RecordType::A => current.ipv4(),
                RecordType::NS => match current.name_target().map(str::to_owned) {
                    Some(target) => self.nameserver_address(&target)?,
                    None => None,
                },
                _ => None,
            };

            let Some(server) = server else { continue };
            if !tried.insert(server) {
                continue;
            }

            match self.query_server(question, server)? {
                Some(records) if !records.is_empty() => {
                    backlog.append(&mut candidates);
                    candidates = self.cache.best_nameservers(question);
                }
                _ => {
                    debug!(server = %server, "hop produced nothing, advancing to next candidate");
                }
            }
        }
    }

    /// Resolves a nameserver's own IPv4 address, from the cache when
    /// possible and through the same iterative machinery otherwise. Bounded
    /// because nameserver names sit closer to the root than the name that
    /// referenced them.
    fn nameserver_address(&mut self, name: &str) -> Result<Option<Ipv4Addr>, LookupError> {
        let question = Question::new(name, RecordType::A, RecordClass::IN);
        let mut found = self.cache.cached_results(&question);
        if found.is_empty() {
            found = self.iterative_query(&question)?;
        }
        Ok(found.iter().find_map(|record| record.ipv4()))
    }

    /// One hop: a single exchange with one server, merging everything the
    /// reply carried into the cache. `Ok(None)` means the server never
    /// produced a usable reply.
    fn query_server(
        &mut self,
        question: &Question,
        server: Ipv4Addr,
    ) -> Result<Option<Vec<ResourceRecord>>, LookupError> {
        match self.transport.exchange(question, server)? {
            Some(message) => Ok(Some(self.merge_response(&message))),
            None => Ok(None),
        }
    }

    fn merge_response(&mut self, message: &Message) -> Vec<ResourceRecord> {
        let header = &message.header;
        self.observer
            .response_header(header.id, header.authoritative, header.rcode);

        let mut merged = Vec::new();
        for section in [Section::Answer, Section::Authority, Section::Additional] {
            self.observer
                .section_header(section, message.declared_count(section));
            for record in message.section(section) {
                self.observer.record(
                    record,
                    record.record_type().code(),
                    record.record_class().code(),
                );
                self.cache.add_result(record.clone());
                push_unique(&mut merged, record.clone());
            }
        }
        merged
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut RecordCache {
        &mut self.cache
    }
}

fn contains_answer(records: &[ResourceRecord], question: &Question) -> bool {
    records.iter().any(|record| record.question == *question)
}

fn push_unique(records: &mut Vec<ResourceRecord>, record: ResourceRecord) {
    if !records.contains(&record) {
        records.push(record);
    }
}
