//! Scripted playback engine shared by the integration tests.
//!
//! Loads can be gated (held until released) or made to fail per URI; every
//! engine call is recorded; status ticks are pushed by the test, including
//! stray ticks on handles that were already unloaded.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{
    status_channel, AudioMode, EngineHandle, EngineStatus, LoadRequest, LoadedSound,
    PlaybackEngine, PlaybackStatus, StatusSender,
};
use core_playback::{PlayableItem, SessionSnapshot, SessionStore};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Configure(AudioMode),
    Load(String),
    Play(EngineHandle),
    Pause(EngineHandle),
    Stop(EngineHandle),
    Seek(EngineHandle, u64),
    Volume(EngineHandle, f32),
    Muted(EngineHandle, bool),
    Unload(EngineHandle),
}

#[derive(Default)]
struct EngineState {
    live: HashSet<EngineHandle>,
    senders: HashMap<EngineHandle, StatusSender>,
    by_uri: HashMap<String, EngineHandle>,
    gates: HashMap<String, Arc<Semaphore>>,
    failing: HashSet<String>,
    reject_transport: bool,
    calls: Vec<EngineCall>,
}

#[derive(Default)]
pub struct ScriptedEngine {
    state: Mutex<EngineState>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hold loads of `uri` until [`release`](Self::release).
    pub fn gate(&self, uri: &str) {
        self.state
            .lock()
            .unwrap()
            .gates
            .insert(uri.to_string(), Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, uri: &str) {
        if let Some(gate) = self.state.lock().unwrap().gates.get(uri) {
            gate.add_permits(1);
        }
    }

    pub fn fail_load(&self, uri: &str) {
        self.state.lock().unwrap().failing.insert(uri.to_string());
    }

    pub fn reject_transport(&self, reject: bool) {
        self.state.lock().unwrap().reject_transport = reject;
    }

    /// Handle returned by the latest successful load of `uri`.
    pub fn handle_for(&self, uri: &str) -> Option<EngineHandle> {
        self.state.lock().unwrap().by_uri.get(uri).copied()
    }

    pub fn live_count(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    pub fn is_live(&self, handle: EngineHandle) -> bool {
        self.state.lock().unwrap().live.contains(&handle)
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn load_count(&self, uri: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, EngineCall::Load(u) if u == uri))
            .count()
    }

    /// Push a status for `handle`, live or not.
    pub fn emit(&self, handle: EngineHandle, status: EngineStatus) {
        if let Some(sender) = self.state.lock().unwrap().senders.get(&handle) {
            let _ = sender.send(status);
        }
    }

    pub fn tick(&self, handle: EngineHandle, status: PlaybackStatus) {
        self.emit(handle, EngineStatus::Update(status));
    }

    /// Wait until `uri` has been requested `count` times.
    pub async fn wait_for_load(&self, uri: &str, count: usize) {
        for _ in 0..200 {
            if self.load_count(uri) >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("load of {uri} was never requested");
    }

    fn record(&self, call: EngineCall) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn transport(&self, handle: EngineHandle, call: EngineCall) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if !state.live.contains(&handle) {
            return Err(BridgeError::stale(handle));
        }
        if state.reject_transport {
            return Err(BridgeError::OperationFailed("transport rejected".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PlaybackEngine for ScriptedEngine {
    async fn configure_audio_mode(&self, mode: AudioMode) -> Result<()> {
        self.record(EngineCall::Configure(mode));
        Ok(())
    }

    async fn load(&self, request: LoadRequest) -> Result<LoadedSound> {
        self.record(EngineCall::Load(request.uri.clone()));

        let gate = self.state.lock().unwrap().gates.get(&request.uri).cloned();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|e| BridgeError::OperationFailed(e.to_string()))?
                .forget();
        }

        let mut state = self.state.lock().unwrap();
        if state.failing.contains(&request.uri) {
            return Err(BridgeError::LoadFailed {
                uri: request.uri,
                reason: "404 Not Found".into(),
            });
        }

        let handle = EngineHandle::new();
        let (tx, rx) = status_channel();
        state.live.insert(handle);
        state.senders.insert(handle, tx);
        state.by_uri.insert(request.uri, handle);
        Ok(LoadedSound::new(handle, rx))
    }

    async fn play(&self, handle: EngineHandle) -> Result<()> {
        self.transport(handle, EngineCall::Play(handle))
    }

    async fn pause(&self, handle: EngineHandle) -> Result<()> {
        self.transport(handle, EngineCall::Pause(handle))
    }

    async fn stop(&self, handle: EngineHandle) -> Result<()> {
        self.transport(handle, EngineCall::Stop(handle))
    }

    async fn seek(&self, handle: EngineHandle, position_ms: u64) -> Result<()> {
        self.transport(handle, EngineCall::Seek(handle, position_ms))
    }

    async fn set_volume(&self, handle: EngineHandle, volume: f32) -> Result<()> {
        self.transport(handle, EngineCall::Volume(handle, volume))
    }

    async fn set_muted(&self, handle: EngineHandle, muted: bool) -> Result<()> {
        self.transport(handle, EngineCall::Muted(handle, muted))
    }

    async fn unload(&self, handle: EngineHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(EngineCall::Unload(handle));
        state.live.remove(&handle);
        Ok(())
    }
}

pub fn sermon(id: &str) -> PlayableItem {
    PlayableItem::new(
        id,
        format!("Sermon {id}"),
        "Pasteur Jean",
        format!("https://cdn.example.com/{id}.mp3"),
    )
}

/// Wait (bounded) until the session satisfies `predicate`.
pub async fn wait_until<F>(store: &SessionStore, predicate: F) -> SessionSnapshot
where
    F: FnMut(&SessionSnapshot) -> bool,
{
    let mut rx = store.subscribe();
    let result = tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate)).await;
    match result {
        Ok(Ok(snapshot)) => snapshot.clone(),
        _ => panic!("session never reached the expected state: {:?}", store.snapshot()),
    }
}

/// Give spawned forwarders a chance to run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}
