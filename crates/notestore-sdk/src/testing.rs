//! Scripted in-process transport for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notestore_models::RpcFault;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::transport::{RpcTransport, TransportFactory};

type Handler = Arc<dyn Fn(&Map<String, Value>) -> Result<Value, RpcFault> + Send + Sync>;

/// Transport answering each method with a scripted closure and counting
/// the calls it receives.
pub(crate) struct ScriptedTransport {
    endpoint: String,
    handlers: Mutex<HashMap<String, Handler>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedTransport {
    pub(crate) fn new(endpoint: &str) -> Arc<Self> {
        Arc::new(Self {
            endpoint: endpoint.to_string(),
            handlers: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            delay: Mutex::new(None),
        })
    }

    pub(crate) fn respond<F>(&self, method: &str, handler: F)
    where
        F: Fn(&Map<String, Value>) -> Result<Value, RpcFault> + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap()
            .insert(method.to_string(), Arc::new(handler));
    }

    /// Sleep this long inside every call, to widen race windows.
    pub(crate) fn delay_calls(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }
}

impl RpcTransport for ScriptedTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn invoke(&self, method: &str, params: Map<String, Value>) -> Result<Value, RpcFault> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default() += 1;

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let handler = self.handlers.lock().unwrap().get(method).cloned();
        match handler {
            Some(handler) => handler(&params),
            None => Err(RpcFault::transport(format!("unscripted method {method}"))),
        }
    }
}

/// Factory handing out one [`ScriptedTransport`] per endpoint.
#[derive(Default)]
pub(crate) struct ScriptedFactory {
    transports: Mutex<HashMap<String, Arc<ScriptedTransport>>>,
    connects: AtomicUsize,
}

impl ScriptedFactory {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The transport for `endpoint`, created on first use.
    pub(crate) fn transport(&self, endpoint: &str) -> Arc<ScriptedTransport> {
        self.transports
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_insert_with(|| ScriptedTransport::new(endpoint))
            .clone()
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl TransportFactory for ScriptedFactory {
    fn connect(&self, endpoint: &str) -> Result<Arc<dyn RpcTransport>, StoreError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.transport(endpoint))
    }
}
