/// End-to-end tests against an in-process GraphLink server
///
/// The server answers from a fixed script and counts what it sees, so the
/// tests can check both what the client returns and what reached the wire.
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use glink_client::{Client, ClientConfig, ClientError, Concept, Numeric, SessionType, TransactionType};
use glink_proto::graph_link_server::{GraphLink, GraphLinkServer};
use glink_proto::transaction::{req, res, res_part, server, stream};
use glink_proto::{answer, concept, database, query, session, transaction};
use glink_test_utils::{init_tracing, wait_until};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::oneshot;
use tonic::{Request, Response, Status, Streaming};

const DATABASE: &str = "social";
const PEOPLE: usize = 3;
const PAGE_SIZE: usize = 2;

#[derive(Default)]
struct ServerState {
    databases: Mutex<BTreeSet<String>>,
    expired: AtomicBool,
    pulses: AtomicUsize,
    session_closes: AtomicUsize,
    opened: AtomicUsize,
    ended: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    continuations: AtomicUsize,
}

impl ServerState {
    fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn person(index: usize) -> answer::ConceptMap {
    let thing = concept::Thing {
        iid: vec![index as u8],
        r#type: Some(concept::Type {
            label: "person".to_string(),
            scope: String::new(),
            encoding: concept::Encoding::EntityType as i32,
            value_type: concept::ValueType::Object as i32,
            is_root: false,
        }),
        value: None,
    };
    let mut map = HashMap::new();
    map.insert(
        "p".to_string(),
        concept::Concept {
            concept: Some(concept::concept::Concept::Thing(thing)),
        },
    );
    answer::ConceptMap { map }
}

fn server_error(message: &str) -> transaction::Error {
    transaction::Error {
        code: "TEST".to_string(),
        message: message.to_string(),
    }
}

/// Answers the requests of one transaction call.
struct TransactionScript {
    state: Arc<ServerState>,
    responses: UnboundedSender<Result<transaction::Server, Status>>,
    cursors: HashMap<Vec<u8>, Vec<answer::ConceptMap>>,
}

impl TransactionScript {
    fn send(&self, message: server::Server) {
        let _ = self.responses.unbounded_send(Ok(transaction::Server {
            server: Some(message),
        }));
    }

    fn res(&self, req_id: &[u8], res: res::Res) {
        self.send(server::Server::Res(transaction::Res {
            req_id: req_id.to_vec(),
            res: Some(res),
        }));
    }

    fn part(&self, req_id: &[u8], res: res_part::Res) {
        self.send(server::Server::ResPart(transaction::ResPart {
            req_id: req_id.to_vec(),
            res: Some(res),
        }));
    }

    fn query_res(&self, req_id: &[u8], res: query::res::Res) {
        self.res(req_id, res::Res::QueryManagerRes(query::Res { res: Some(res) }));
    }

    /// Send one page of answers, then a continue or done marker.
    fn next_page(&mut self, req_id: &[u8]) {
        let Some(mut page) = self.cursors.remove(req_id) else {
            self.part(req_id, res_part::Res::Error(server_error("no answers pending")));
            return;
        };
        let rest = page.split_off(page.len().min(PAGE_SIZE));
        if !page.is_empty() {
            let answers = query::ResPart {
                res: Some(query::res_part::Res::MatchResPart(query::r#match::ResPart {
                    answers: page,
                })),
            };
            self.part(req_id, res_part::Res::QueryManagerResPart(answers));
        }
        let state = if rest.is_empty() {
            stream::State::Done
        } else {
            self.cursors.insert(req_id.to_vec(), rest);
            stream::State::Continue
        };
        self.part(
            req_id,
            res_part::Res::StreamResPart(stream::ResPart {
                state: state as i32,
            }),
        );
    }

    fn query(&mut self, req_id: &[u8], request: query::req::Req) {
        match request {
            query::req::Req::MatchReq(_) => {
                self.cursors
                    .insert(req_id.to_vec(), (0..PEOPLE).map(person).collect());
                self.next_page(req_id);
            }
            query::req::Req::MatchAggregateReq(_) => self.query_res(
                req_id,
                query::res::Res::MatchAggregateRes(query::match_aggregate::Res {
                    answer: Some(answer::Numeric {
                        value: Some(answer::numeric::Value::LongValue(PEOPLE as i64)),
                    }),
                }),
            ),
            query::req::Req::DefineReq(_) => {
                self.query_res(req_id, query::res::Res::DefineRes(query::define::Res {}))
            }
            _ => self.res(req_id, res::Res::Error(server_error("unsupported query"))),
        }
    }

    fn handle(&mut self, request: transaction::Req) {
        let id = request.req_id;
        match request.req {
            Some(req::Req::OpenReq(_)) => {
                self.state.opened.fetch_add(1, Ordering::SeqCst);
                self.res(&id, res::Res::OpenRes(transaction::open::Res {}));
            }
            Some(req::Req::CommitReq(_)) => {
                self.state.commits.fetch_add(1, Ordering::SeqCst);
                self.res(&id, res::Res::CommitRes(transaction::commit::Res {}));
            }
            Some(req::Req::RollbackReq(_)) => {
                self.state.rollbacks.fetch_add(1, Ordering::SeqCst);
                self.res(&id, res::Res::RollbackRes(transaction::rollback::Res {}));
            }
            Some(req::Req::StreamReq(_)) => {
                self.state.continuations.fetch_add(1, Ordering::SeqCst);
                self.next_page(&id);
            }
            Some(req::Req::QueryManagerReq(query::Req {
                req: Some(query), ..
            })) => self.query(&id, query),
            _ => self.res(&id, res::Res::Error(server_error("malformed request"))),
        }
    }

    fn handle_frame(&mut self, frame: transaction::Client) {
        for request in frame.reqs {
            self.handle(request);
        }
    }
}

struct ScriptedGraph {
    state: Arc<ServerState>,
}

#[tonic::async_trait]
impl GraphLink for ScriptedGraph {
    async fn databases_contains(
        &self,
        request: Request<database::contains::Req>,
    ) -> Result<Response<database::contains::Res>, Status> {
        let contains = self.state.databases.lock().contains(&request.into_inner().name);
        Ok(Response::new(database::contains::Res { contains }))
    }

    async fn databases_create(
        &self,
        request: Request<database::create::Req>,
    ) -> Result<Response<database::create::Res>, Status> {
        let name = request.into_inner().name;
        if !self.state.databases.lock().insert(name.clone()) {
            return Err(Status::already_exists(name));
        }
        Ok(Response::new(database::create::Res {}))
    }

    async fn databases_all(
        &self,
        _request: Request<database::all::Req>,
    ) -> Result<Response<database::all::Res>, Status> {
        let names = self.state.databases.lock().iter().cloned().collect();
        Ok(Response::new(database::all::Res { names }))
    }

    async fn database_delete(
        &self,
        request: Request<database::delete::Req>,
    ) -> Result<Response<database::delete::Res>, Status> {
        let name = request.into_inner().name;
        if !self.state.databases.lock().remove(&name) {
            return Err(Status::not_found(name));
        }
        Ok(Response::new(database::delete::Res {}))
    }

    async fn session_open(
        &self,
        request: Request<session::open::Req>,
    ) -> Result<Response<session::open::Res>, Status> {
        let database = request.into_inner().database;
        if !self.state.databases.lock().contains(&database) {
            return Err(Status::not_found(database));
        }
        Ok(Response::new(session::open::Res {
            session_id: vec![7; 16],
            server_duration_millis: 0,
        }))
    }

    async fn session_pulse(
        &self,
        _request: Request<session::pulse::Req>,
    ) -> Result<Response<session::pulse::Res>, Status> {
        self.state.pulses.fetch_add(1, Ordering::SeqCst);
        Ok(Response::new(session::pulse::Res {
            alive: !self.state.expired.load(Ordering::SeqCst),
        }))
    }

    async fn session_close(
        &self,
        _request: Request<session::close::Req>,
    ) -> Result<Response<session::close::Res>, Status> {
        self.state.session_closes.fetch_add(1, Ordering::SeqCst);
        Ok(Response::new(session::close::Res {}))
    }

    type TransactionStream = UnboundedReceiver<Result<transaction::Server, Status>>;

    async fn transaction(
        &self,
        request: Request<Streaming<transaction::Client>>,
    ) -> Result<Response<Self::TransactionStream>, Status> {
        let mut inbound = request.into_inner();
        // Response headers go out only once the client's first frame is in
        let first = inbound
            .message()
            .await?
            .ok_or_else(|| Status::invalid_argument("transaction ended before open"))?;

        let (sender, receiver) = mpsc::unbounded();
        let mut script = TransactionScript {
            state: Arc::clone(&self.state),
            responses: sender,
            cursors: HashMap::new(),
        };
        script.handle_frame(first);
        tokio::spawn(async move {
            while let Ok(Some(frame)) = inbound.message().await {
                script.handle_frame(frame);
            }
            script.state.ended.fetch_add(1, Ordering::SeqCst);
        });
        Ok(Response::new(receiver))
    }
}

/// A scripted server listening on an ephemeral local port.
struct TestServer {
    state: Arc<ServerState>,
    address: String,
    shutdown: Option<oneshot::Sender<()>>,
    _runtime: Runtime,
}

impl TestServer {
    fn start() -> Self {
        init_tracing();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        let incoming = futures::stream::unfold(listener, |listener| async move {
            let accepted = listener.accept().await.map(|(socket, _)| socket);
            Some((accepted, listener))
        });

        let state = Arc::new(ServerState::default());
        state.databases.lock().insert(DATABASE.to_string());
        let service = GraphLinkServer::new(ScriptedGraph {
            state: Arc::clone(&state),
        });
        let (shutdown, signal) = oneshot::channel::<()>();
        runtime.spawn(
            tonic::transport::Server::builder()
                .add_service(service)
                .serve_with_incoming_shutdown(Box::pin(incoming), async move {
                    let _ = signal.await;
                }),
        );

        Self {
            state,
            address,
            shutdown: Some(shutdown),
            _runtime: runtime,
        }
    }

    fn client(&self, config: ClientConfig) -> Client {
        Client::with_config(self.address.clone(), config.with_request_timeout(Duration::from_secs(10)))
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

#[test]
fn test_transaction_round_trip() {
    let server = TestServer::start();
    let client = server.client(ClientConfig::new());
    let session = client.session(DATABASE, SessionType::Data).unwrap();

    // The server waits for the open request before starting the call
    let transaction = session.transaction(TransactionType::Write).unwrap();
    assert!(transaction.is_open());
    assert_eq!(ServerState::count(&server.state.opened), 1);
    assert_eq!(session.open_transactions(), 1);

    let answers: Vec<_> = transaction
        .query()
        .r#match("match $p isa person;")
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(answers.len(), PEOPLE);
    for (index, answer) in answers.iter().enumerate() {
        let person = answer.get("p").unwrap();
        assert!(matches!(person, Concept::Entity(_)));
        assert_eq!(person.label(), "person");
        assert_eq!(person.iid(), Some(&[index as u8][..]));
    }
    assert_eq!(ServerState::count(&server.state.continuations), 1);

    transaction.commit().unwrap();
    assert_eq!(ServerState::count(&server.state.commits), 1);
    assert!(wait_until(Duration::from_secs(5), || {
        ServerState::count(&server.state.ended) == 1
    }));
    assert_eq!(session.open_transactions(), 0);

    session.close().unwrap();
    assert!(!session.is_open());
    assert_eq!(ServerState::count(&server.state.session_closes), 1);
    client.close();
}

#[test]
fn test_single_shot_queries_and_server_errors() {
    let server = TestServer::start();
    let client = server.client(ClientConfig::new());
    let session = client.session(DATABASE, SessionType::Schema).unwrap();
    let transaction = session.transaction(TransactionType::Write).unwrap();

    let count = transaction.query().match_aggregate("match $p isa person; count;").unwrap();
    assert_eq!(count, Numeric::Long(PEOPLE as i64));

    // An error answers only its own request
    let err = transaction.query().delete("match $p isa person; delete $p;").unwrap_err();
    match err {
        ClientError::Transaction(glink_core::Error::Server { code, message }) => {
            assert_eq!(code, "TEST");
            assert_eq!(message, "unsupported query");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(transaction.is_open());

    transaction.query().define("define person sub entity;").unwrap();
    transaction.rollback().unwrap();
    assert_eq!(ServerState::count(&server.state.rollbacks), 1);
    assert!(transaction.is_open());

    drop(transaction);
    assert!(wait_until(Duration::from_secs(5), || {
        ServerState::count(&server.state.ended) == 1
    }));
    assert_eq!(ServerState::count(&server.state.commits), 0);
    client.close();
}

#[test]
fn test_concurrent_transactions_on_one_session() {
    let server = TestServer::start();
    let client = server.client(ClientConfig::new().with_worker_count(2));
    let session = client.session(DATABASE, SessionType::Data).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let session = session.clone();
            std::thread::spawn(move || {
                let transaction = session.transaction(TransactionType::Read).unwrap();
                let answers = transaction.query().r#match("match $p isa person;").unwrap();
                answers.map(|answer| answer.unwrap()).count()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), PEOPLE);
    }

    assert_eq!(ServerState::count(&server.state.opened), 4);
    assert!(wait_until(Duration::from_secs(5), || {
        ServerState::count(&server.state.ended) == 4
    }));
    assert_eq!(session.open_transactions(), 0);
    client.close();
}

#[test]
fn test_expired_session_still_closes() {
    let server = TestServer::start();
    let client = server.client(ClientConfig::new().with_pulse_interval(Duration::from_millis(20)));
    let session = client.session(DATABASE, SessionType::Data).unwrap();
    let transaction = session.transaction(TransactionType::Read).unwrap();

    server.state.expired.store(true, Ordering::SeqCst);
    assert!(wait_until(Duration::from_secs(5), || !session.is_open()));
    assert!(ServerState::count(&server.state.pulses) >= 1);
    assert!(transaction.is_open());

    let err = session.transaction(TransactionType::Read).unwrap_err();
    assert_eq!(err.code(), "SESSION_CLOSED");

    session.close().unwrap();
    assert!(!transaction.is_open());
    assert_eq!(session.open_transactions(), 0);
    assert_eq!(ServerState::count(&server.state.session_closes), 1);
    assert!(wait_until(Duration::from_secs(5), || {
        ServerState::count(&server.state.ended) == 1
    }));

    // Closing again does not reach the server
    session.close().unwrap();
    assert_eq!(ServerState::count(&server.state.session_closes), 1);
    client.close();
}

#[test]
fn test_client_close_closes_sessions() {
    let server = TestServer::start();
    let client = server.client(ClientConfig::new());
    let session = client.session(DATABASE, SessionType::Data).unwrap();
    let transaction = session.transaction(TransactionType::Write).unwrap();

    client.close();
    assert!(!client.is_open());
    assert!(!session.is_open());
    assert!(!transaction.is_open());
    assert_eq!(ServerState::count(&server.state.session_closes), 1);

    let err = client.session(DATABASE, SessionType::Data).unwrap_err();
    assert_eq!(err.code(), "CLIENT_CLOSED");
}

#[test]
fn test_database_manager() {
    let server = TestServer::start();
    let client = server.client(ClientConfig::new());
    let databases = client.databases();

    assert!(databases.contains(DATABASE).unwrap());
    assert!(!databases.contains("library").unwrap());

    databases.create("library").unwrap();
    assert!(matches!(
        databases.create("library"),
        Err(ClientError::AlreadyExists(_))
    ));
    assert_eq!(databases.all().unwrap(), vec!["library".to_string(), DATABASE.to_string()]);

    databases.delete("library").unwrap();
    assert!(!databases.contains("library").unwrap());
    assert!(matches!(databases.delete("library"), Err(ClientError::NotFound(_))));

    assert!(matches!(
        client.session("library", SessionType::Data),
        Err(ClientError::NotFound(_))
    ));
    client.close();
}
