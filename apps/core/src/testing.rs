//! Scripted backend for the async tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::api::{ApiRequest, ApiResponse, Backend, Endpoint};
use crate::error::FetchError;

pub const EVENTS: &str = r#"["Bahrain Grand Prix", "Saudi Arabian Grand Prix"]"#;
pub const RESULTS: &str = r#"<table class="results"><tr><td>1</td><td>Max Verstappen</td></tr></table>"#;
pub const POSITIONS: &str = r##"[
    {"name": "VER", "laps": [1, 2, 3], "positions": [1, 1, 1], "color": "#3671C6"},
    {"name": "PER", "laps": [1, 2, 3], "positions": [2, 2, 2], "color": "#3671C6", "dash": "dash"}
]"##;
pub const TYRES: &str = r#"[
    {"driver": "VER", "stints": [{"compound": "SOFT", "stint_length": 15}, {"compound": "HARD", "stint_length": 15}]},
    {"driver": "ALO", "stints": [{"compound": "MEDIUM", "stint_length": 30}]}
]"#;
pub const PITSTOPS: &str = r#"{
    "total_pitstops": 3,
    "teams": {
        "Red Bull Racing": {"avg_time": 22.4, "total_stops": 2, "stops": [{"driver": "VER", "time": 22.0}, {"driver": "PER", "time": 22.8}]},
        "Aston Martin": {"avg_time": 23.1, "total_stops": 1, "stops": [{"driver": "ALO", "time": 23.1}]}
    }
}"#;
pub const TRACK_STATS: &str = r#"{
    "track_info": {"name": "Bahrain International Circuit", "country": "Bahrain", "location": "Sakhir"},
    "circuit_length": "5.412 km",
    "turns_count": 15,
    "coordinates": [{"x": 100, "y": 100}, {"x": 400, "y": 120}, {"x": 380, "y": 400}]
}"#;

type Reply = Result<ApiResponse, FetchError>;

enum Scripted {
    Ready(Reply),
    Deferred(oneshot::Receiver<Reply>),
}

/// Answers each endpoint from a queue, in request order. An endpoint with an
/// empty queue fails as a network error.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: RefCell<HashMap<Endpoint, VecDeque<Scripted>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, endpoint: Endpoint, body: &str) {
        self.reply(endpoint, Ok(ApiResponse::ok(body)));
    }

    pub fn reply(&self, endpoint: Endpoint, reply: Reply) {
        self.push(endpoint, Scripted::Ready(reply));
    }

    /// The request waits until the returned sender fires.
    pub fn defer(&self, endpoint: Endpoint) -> oneshot::Sender<Reply> {
        let (sender, receiver) = oneshot::channel();
        self.push(endpoint, Scripted::Deferred(receiver));
        sender
    }

    /// One successful answer for every panel of a race.
    pub fn script_race(&self) {
        self.script_race_without(&[]);
    }

    pub fn script_race_without(&self, skip: &[Endpoint]) {
        let panels = [
            (Endpoint::Results, RESULTS),
            (Endpoint::Positions, POSITIONS),
            (Endpoint::TyreStrategy, TYRES),
            (Endpoint::PitstopAnalysis, PITSTOPS),
            (Endpoint::TrackStats, TRACK_STATS),
        ];
        for (endpoint, body) in panels {
            if !skip.contains(&endpoint) {
                self.respond(endpoint, body);
            }
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn requested(&self, endpoint: Endpoint) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|request| request.endpoint == endpoint)
            .count()
    }

    fn push(&self, endpoint: Endpoint, scripted: Scripted) {
        self.replies
            .borrow_mut()
            .entry(endpoint)
            .or_default()
            .push_back(scripted);
    }
}

#[async_trait(?Send)]
impl Backend for ScriptedBackend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        self.requests.borrow_mut().push(request.clone());
        let next = self
            .replies
            .borrow_mut()
            .get_mut(&request.endpoint)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Deferred(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err(FetchError::Network("request cancelled".to_string()))),
            None => Err(FetchError::Network(format!(
                "nothing scripted for {}",
                request.path()
            ))),
        }
    }
}
