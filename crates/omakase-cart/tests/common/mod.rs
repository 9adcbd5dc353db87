//! In-process cart backend for flow tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use omakase_cart::{
    CacheObserver, CartConfig, CartProvider, CartService, CartSnapshot, DataOrigin, Money,
    Product, QueryState,
};
use omakase_http::{FetchError, Method, RequestBuilder, Response, Transport};
use omakase_store::{MemoryStore, Storage};
use serde_json::{json, Value};
use tokio::sync::Notify;

/// Flat shipping fee added to non-empty carts.
pub const SHIPPING: Money = Money::new(1000);

/// How a scripted request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Answer with this HTTP status.
    Status(u16),
    /// Never reach the backend.
    Transport,
}

/// One request as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub session: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct StoredLine {
    id: u64,
    name: String,
    image: String,
    unit_price: Money,
    quantity: u32,
    notes: String,
}

#[derive(Default)]
struct State {
    carts: HashMap<String, Vec<StoredLine>>,
    failures: HashMap<Method, Failure>,
    log: Vec<Seen>,
}

/// Fake backend keyed by the `session-id` header.
///
/// Line prices are computed server-side as unit price times quantity.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    gates: Mutex<HashMap<Method, Arc<Notify>>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every request with `method` fail until [`heal`](Self::heal).
    pub fn fail(&self, method: Method, failure: Failure) {
        self.state.lock().unwrap().failures.insert(method, failure);
    }

    /// Hold the next request with `method` until the returned gate is notified.
    pub fn hold(&self, method: Method) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(method, gate.clone());
        gate
    }

    pub fn heal(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// Put a line directly into a session's cart.
    pub fn seed(&self, session: &str, product: &Product, quantity: u32) {
        let mut state = self.state.lock().unwrap();
        state
            .carts
            .entry(session.to_string())
            .or_default()
            .push(StoredLine {
                id: product.id.get(),
                name: product.name.clone(),
                image: product.image.clone(),
                unit_price: product.price,
                quantity,
                notes: String::new(),
            });
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn request_count(&self, method: Method) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }

    pub fn clear_log(&self) {
        self.state.lock().unwrap().log.clear();
    }

    /// What `GET /cart` would return for a session.
    pub fn cart(&self, session: &str) -> CartSnapshot {
        let state = self.state.lock().unwrap();
        let body = render_cart(state.carts.get(session).map(Vec::as_slice).unwrap_or(&[]));
        serde_json::from_value(body).unwrap()
    }

    fn handle(&self, request: &RequestBuilder) -> Result<(u16, Value), FetchError> {
        let mut state = self.state.lock().unwrap();
        let body: Option<Value> = request
            .body
            .as_ref()
            .map(|b| serde_json::from_slice(b).unwrap());
        let session = request.header_value("session-id").map(str::to_string);
        state.log.push(Seen {
            method: request.method,
            path: request.path().to_string(),
            session: session.clone(),
            body: body.clone(),
        });

        match state.failures.get(&request.method) {
            Some(Failure::Transport) => {
                return Err(FetchError::RequestError("connection refused".to_string()))
            }
            Some(Failure::Status(status)) => {
                return Ok((*status, json!({"erro": "indisponível"})));
            }
            None => {}
        }

        let Some(session) = session else {
            return Ok((400, json!({"erro": "session-id ausente"})));
        };
        let cart = state.carts.entry(session).or_default();
        let id = request
            .path()
            .strip_prefix("/cart/")
            .and_then(|id| id.parse::<u64>().ok());

        match (request.method, id) {
            (Method::Get, None) => Ok((200, render_cart(cart))),
            (Method::Post, None) => {
                let body = body.unwrap_or_default();
                let id = body["id"].as_u64().unwrap();
                let quantity = body["quantidadeCarrinho"].as_u64().unwrap() as u32;
                match cart.iter_mut().find(|l| l.id == id) {
                    Some(line) => line.quantity += quantity,
                    None => cart.push(StoredLine {
                        id,
                        name: body["nome"].as_str().unwrap_or_default().to_string(),
                        image: body["imagem"].as_str().unwrap_or_default().to_string(),
                        unit_price: Money::from_decimal(body["preco"].as_f64().unwrap()),
                        quantity,
                        notes: body["observacoes"].as_str().unwrap_or_default().to_string(),
                    }),
                }
                Ok((201, body))
            }
            (Method::Put, Some(id)) => {
                let body = body.unwrap_or_default();
                match cart.iter_mut().find(|l| l.id == id) {
                    Some(line) => {
                        line.quantity = body["quantidadeCarrinho"].as_u64().unwrap() as u32;
                        Ok((200, render_line(line)))
                    }
                    None => Ok((404, json!({"erro": "item não encontrado"}))),
                }
            }
            (Method::Delete, Some(id)) => match cart.iter().position(|l| l.id == id) {
                Some(idx) => Ok((200, render_line(&cart.remove(idx)))),
                None => Ok((404, json!({"erro": "item não encontrado"}))),
            },
            _ => Ok((405, Value::Null)),
        }
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let gate = self.gates.lock().unwrap().remove(&request.method);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let (status, body) = self.handle(&request)?;
        let mut response = Response::json_ok(&body)?;
        response.status = status;
        Ok(response)
    }
}

fn render_line(line: &StoredLine) -> Value {
    let price = line.unit_price.try_multiply(line.quantity).unwrap();
    json!({
        "id": line.id,
        "nome": line.name,
        "imagem": line.image,
        "preco": f64::from(price),
        "quantidadeCarrinho": line.quantity,
        "observacoes": line.notes,
    })
}

fn render_cart(lines: &[StoredLine]) -> Value {
    let subtotal = lines.iter().fold(Money::zero(), |acc, l| {
        acc + l.unit_price.try_multiply(l.quantity).unwrap()
    });
    let total = if lines.is_empty() {
        Money::zero()
    } else {
        subtotal + SHIPPING
    };
    json!({
        "carrinho": lines.iter().map(render_line).collect::<Vec<_>>(),
        "valorTotal": f64::from(subtotal),
        "valorTotalFrete": f64::from(total),
    })
}

/// Records every data write the cache publishes.
#[derive(Default)]
pub struct Recorder {
    writes: Mutex<Vec<(DataOrigin, CartSnapshot)>>,
}

impl Recorder {
    pub fn writes(&self) -> Vec<(DataOrigin, CartSnapshot)> {
        self.writes.lock().unwrap().clone()
    }

    /// Data of writes with the given origin.
    pub fn with_origin(&self, origin: DataOrigin) -> Vec<CartSnapshot> {
        self.writes()
            .into_iter()
            .filter(|(o, _)| *o == origin)
            .map(|(_, data)| data)
            .collect()
    }
}

impl CacheObserver for Recorder {
    fn on_change(&self, state: &QueryState) {
        if let (Some(origin), Some(data)) = (state.origin, &state.data) {
            self.writes.lock().unwrap().push((origin, data.clone()));
        }
    }
}

/// A provider over the fake backend, plus its storage.
pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub storage: Storage,
    pub provider: CartProvider,
    pub recorder: Arc<Recorder>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(FakeBackend::new(), Storage::new(MemoryStore::new()))
    }

    /// Build a provider over existing storage, as after a reload.
    pub fn with_storage(backend: Arc<FakeBackend>, storage: Storage) -> Self {
        let service = CartService::new(&CartConfig::default(), storage.clone(), backend.clone())
            .unwrap();
        let recorder = Arc::new(Recorder::default());
        service.cache().add_observer(recorder.clone());
        Self {
            backend,
            storage,
            provider: CartProvider::new(service),
            recorder,
        }
    }

    pub fn service(&self) -> &Arc<CartService> {
        self.provider.service()
    }

    pub fn session(&self) -> String {
        self.service().session_id().to_string()
    }
}

pub fn temaki() -> Product {
    Product::new(1u64, "Temaki", Money::from_decimal(20.0), "temaki.png")
}

pub fn guioza() -> Product {
    Product::new(4u64, "Guioza", Money::from_decimal(18.9), "guioza.png")
}
