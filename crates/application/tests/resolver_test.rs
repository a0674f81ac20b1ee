use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

use rootwalk_application::{DnsTransport, NoopObserver, QueryObserver, RecordCache, Resolver};
use rootwalk_domain::{
    Header, LookupError, Message, Question, RecordClass, RecordData, RecordType, ResourceRecord,
    RootHint, Section,
};

const ROOT_A: Ipv4Addr = Ipv4Addr::new(198, 41, 0, 4);
const ROOT_B: Ipv4Addr = Ipv4Addr::new(170, 247, 170, 2);

fn question(host: &str, record_type: RecordType) -> Question {
    Question::new(host, record_type, RecordClass::IN)
}

fn a_record(host: &str, addr: Ipv4Addr) -> ResourceRecord {
    ResourceRecord::new(question(host, RecordType::A), 3600, RecordData::Ipv4(addr))
}

fn ns_record(zone: &str, target: &str) -> ResourceRecord {
    ResourceRecord::new(
        question(zone, RecordType::NS),
        3600,
        RecordData::Name(target.to_string()),
    )
}

fn cname_record(host: &str, target: &str) -> ResourceRecord {
    ResourceRecord::new(
        question(host, RecordType::CNAME),
        3600,
        RecordData::Name(target.to_string()),
    )
}

/// What a scripted server answers for one (question, server) pair.
#[derive(Clone)]
enum Reply {
    Answer(Vec<ResourceRecord>),
    Referral {
        authorities: Vec<ResourceRecord>,
        additionals: Vec<ResourceRecord>,
    },
    Rcode(u8),
    Silent,
}

fn response(reply: &Reply, asked: &Question) -> Message {
    let (answers, authorities, additionals) = match reply {
        Reply::Answer(records) => (records.clone(), Vec::new(), Vec::new()),
        Reply::Referral {
            authorities,
            additionals,
        } => (Vec::new(), authorities.clone(), additionals.clone()),
        _ => unreachable!("only record replies build messages"),
    };
    Message {
        header: Header {
            response: true,
            question_count: 1,
            answer_count: answers.len() as u16,
            authority_count: authorities.len() as u16,
            additional_count: additionals.len() as u16,
            ..Default::default()
        },
        questions: vec![asked.clone()],
        answers,
        authorities,
        additionals,
    }
}

type ExchangeLog = Arc<Mutex<Vec<(String, Ipv4Addr)>>>;

/// In-process transport answering from a fixed script, recording every
/// exchange it performs.
#[derive(Default)]
struct ScriptedTransport {
    rules: Vec<((String, u16, Ipv4Addr), Reply)>,
    log: ExchangeLog,
}

impl ScriptedTransport {
    fn rule(mut self, host: &str, record_type: RecordType, server: Ipv4Addr, reply: Reply) -> Self {
        self.rules
            .push(((host.to_string(), record_type.code(), server), reply));
        self
    }

    fn log_handle(&self) -> ExchangeLog {
        self.log.clone()
    }
}

impl DnsTransport for ScriptedTransport {
    fn exchange(
        &self,
        asked: &Question,
        server: Ipv4Addr,
    ) -> Result<Option<Message>, LookupError> {
        self.log
            .lock()
            .unwrap()
            .push((asked.host_name.clone(), server));

        let key = (asked.host_name.clone(), asked.record_type.code(), server);
        match self.rules.iter().find(|(rule, _)| *rule == key) {
            Some((_, Reply::Rcode(code))) => Err(LookupError::ServerRcode { code: *code }),
            Some((_, Reply::Silent)) | None => Ok(None),
            Some((_, reply)) => Ok(Some(response(reply, asked))),
        }
    }
}

fn single_root() -> Vec<RootHint> {
    vec![RootHint {
        name: "a.root-servers.net".to_string(),
        address: ROOT_A,
    }]
}

fn two_roots() -> Vec<RootHint> {
    vec![
        RootHint {
            name: "a.root-servers.net".to_string(),
            address: ROOT_A,
        },
        RootHint {
            name: "b.root-servers.net".to_string(),
            address: ROOT_B,
        },
    ]
}

fn resolver_with(hints: &[RootHint], transport: ScriptedTransport) -> Resolver<ScriptedTransport> {
    Resolver::new(
        RecordCache::with_hints(hints),
        transport,
        Arc::new(NoopObserver),
    )
}

#[test]
fn full_delegation_walk_from_root_hints() {
    let tld_server = Ipv4Addr::new(192, 5, 6, 30);
    let auth_server = Ipv4Addr::new(93, 184, 216, 1);
    let answer_addr = Ipv4Addr::new(93, 184, 216, 34);

    let transport = ScriptedTransport::default()
        .rule(
            "www.example.com",
            RecordType::A,
            ROOT_A,
            Reply::Referral {
                authorities: vec![ns_record("com", "a.gtld-servers.net")],
                additionals: vec![a_record("a.gtld-servers.net", tld_server)],
            },
        )
        .rule(
            "www.example.com",
            RecordType::A,
            tld_server,
            Reply::Referral {
                authorities: vec![ns_record("example.com", "ns1.example.com")],
                additionals: vec![a_record("ns1.example.com", auth_server)],
            },
        )
        .rule(
            "www.example.com",
            RecordType::A,
            auth_server,
            Reply::Answer(vec![a_record("www.example.com", answer_addr)]),
        );
    let log = transport.log_handle();
    let mut resolver = resolver_with(&single_root(), transport);

    let records = resolver
        .resolve(&question("www.example.com", RecordType::A), 10)
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ipv4(), Some(answer_addr));
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            ("www.example.com".to_string(), ROOT_A),
            ("www.example.com".to_string(), tld_server),
            ("www.example.com".to_string(), auth_server),
        ]
    );
}

#[test]
fn nonzero_rcode_surfaces_without_trying_siblings() {
    let transport =
        ScriptedTransport::default().rule("missing.example", RecordType::A, ROOT_A, Reply::Rcode(3));
    let log = transport.log_handle();
    let mut resolver = resolver_with(&two_roots(), transport);

    let err = resolver
        .resolve(&question("missing.example", RecordType::A), 10)
        .unwrap_err();
    assert_eq!(err, LookupError::ServerRcode { code: 3 });
    assert_eq!(log.lock().unwrap().len(), 1, "no cross-server retry");
}

#[test]
fn unreachable_server_falls_back_to_sibling() {
    let answer_addr = Ipv4Addr::new(10, 1, 2, 3);
    let transport = ScriptedTransport::default()
        .rule("x.test", RecordType::A, ROOT_A, Reply::Silent)
        .rule(
            "x.test",
            RecordType::A,
            ROOT_B,
            Reply::Answer(vec![a_record("x.test", answer_addr)]),
        );
    let log = transport.log_handle();
    let mut resolver = resolver_with(&two_roots(), transport);

    let records = resolver
        .resolve(&question("x.test", RecordType::A), 10)
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ipv4(), Some(answer_addr));
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            ("x.test".to_string(), ROOT_A),
            ("x.test".to_string(), ROOT_B),
        ]
    );
}

#[test]
fn exhausting_every_server_yields_empty_result() {
    let transport =
        ScriptedTransport::default().rule("y.test", RecordType::A, ROOT_A, Reply::Silent);
    let mut resolver = resolver_with(&two_roots(), transport);

    let records = resolver
        .resolve(&question("y.test", RecordType::A), 10)
        .unwrap();
    assert!(records.is_empty());
}

fn chain_of_two_cnames() -> ScriptedTransport {
    ScriptedTransport::default()
        .rule(
            "a.test",
            RecordType::A,
            ROOT_A,
            Reply::Answer(vec![cname_record("a.test", "b.test")]),
        )
        .rule(
            "b.test",
            RecordType::A,
            ROOT_A,
            Reply::Answer(vec![cname_record("b.test", "c.test")]),
        )
        .rule(
            "c.test",
            RecordType::A,
            ROOT_A,
            Reply::Answer(vec![a_record("c.test", Ipv4Addr::new(10, 9, 8, 7))]),
        )
}

#[test]
fn cname_chain_is_chased_within_budget() {
    let mut resolver = resolver_with(&single_root(), chain_of_two_cnames());

    let records = resolver
        .resolve(&question("a.test", RecordType::A), 2)
        .unwrap();

    assert_eq!(records.len(), 3);
    assert!(records.contains(&cname_record("a.test", "b.test")));
    assert!(records.contains(&cname_record("b.test", "c.test")));
    assert!(records.contains(&a_record("c.test", Ipv4Addr::new(10, 9, 8, 7))));
}

#[test]
fn cname_chain_longer_than_budget_is_an_error() {
    let mut resolver = resolver_with(&single_root(), chain_of_two_cnames());

    let err = resolver
        .resolve(&question("a.test", RecordType::A), 1)
        .unwrap_err();
    assert_eq!(err, LookupError::IndirectionLimit);
}

#[test]
fn negative_budget_fails_before_any_network_activity() {
    let transport = ScriptedTransport::default();
    let log = transport.log_handle();
    let mut resolver = resolver_with(&single_root(), transport);

    let err = resolver
        .resolve(&question("a.test", RecordType::A), -1)
        .unwrap_err();
    assert_eq!(err, LookupError::IndirectionLimit);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn cache_hit_answers_without_network_activity() {
    let transport = ScriptedTransport::default();
    let log = transport.log_handle();
    let mut resolver = resolver_with(&single_root(), transport);

    let cached = a_record("cached.test", Ipv4Addr::new(10, 0, 0, 1));
    resolver.cache_mut().add_result(cached.clone());

    let records = resolver
        .resolve(&question("cached.test", RecordType::A), 10)
        .unwrap();
    assert_eq!(records, vec![cached]);
    assert!(log.lock().unwrap().is_empty());
}

/// Observer recording which callbacks fired; the side-channel contract says
/// they happen at fixed points without changing the outcome.
#[derive(Default)]
struct CapturingObserver {
    events: Mutex<Vec<String>>,
}

impl QueryObserver for CapturingObserver {
    fn query_sent(&self, asked: &Question, server: Ipv4Addr, _id: u16) {
        self.events
            .lock()
            .unwrap()
            .push(format!("query {} @{server}", asked.host_name));
    }

    fn response_header(&self, _id: u16, authoritative: bool, rcode: u8) {
        self.events
            .lock()
            .unwrap()
            .push(format!("header aa={authoritative} rcode={rcode}"));
    }

    fn section_header(&self, section: Section, count: u16) {
        self.events
            .lock()
            .unwrap()
            .push(format!("section {} [{count}]", section.label()));
    }

    fn record(&self, record: &ResourceRecord, type_code: u16, _class_code: u16) {
        self.events
            .lock()
            .unwrap()
            .push(format!("record {} type {type_code}", record.host_name()));
    }
}

#[test]
fn observer_sees_headers_sections_and_records() {
    let transport = ScriptedTransport::default().rule(
        "plain.test",
        RecordType::A,
        ROOT_A,
        Reply::Answer(vec![a_record("plain.test", Ipv4Addr::new(10, 1, 1, 1))]),
    );
    let observer = Arc::new(CapturingObserver::default());
    let mut resolver = Resolver::new(
        RecordCache::with_hints(&single_root()),
        transport,
        observer.clone(),
    );

    let records = resolver
        .resolve(&question("plain.test", RecordType::A), 10)
        .unwrap();
    assert_eq!(records.len(), 1);

    let events = observer.events.lock().unwrap().clone();
    assert!(events.contains(&"header aa=false rcode=0".to_string()));
    assert!(events.contains(&"section answer [1]".to_string()));
    assert!(events.contains(&"section authority [0]".to_string()));
    assert!(events.contains(&"section additional [0]".to_string()));
    assert!(events.contains(&"record plain.test type 1".to_string()));
}
