use crate::gui_bridge::model::{AnswerRequest, ErrorReply};
use crate::workflow::store::HistoryStore;
use creatorcore::analytics::{AnalyticsSession, CalculationHistory, KeyValueStore, QUESTIONS};
use creatorcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use log::{error, info, warn};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    thread,
};
use tokio::runtime::Builder;
use warp::{
    http::StatusCode,
    reply::{Reply, Response},
    Filter, Rejection,
};

fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

type SharedHistory<S> = Arc<Mutex<CalculationHistory<S>>>;

fn error_reply(status: StatusCode, message: impl Into<String>) -> Response {
    warp::reply::with_status(warp::reply::json(&ErrorReply::new(message)), status).into_response()
}

fn handle_answer<S: KeyValueStore>(
    request: AnswerRequest,
    history: &Mutex<CalculationHistory<S>>,
    metrics: Arc<MetricsRecorder>,
) -> Response {
    let mut session = AnalyticsSession::new(request.records).with_metrics(metrics);
    let now = session.now();
    let Some(result) = session.answer_id(&request.question_id).cloned() else {
        return error_reply(
            StatusCode::NOT_FOUND,
            format!("unknown question id '{}'", request.question_id),
        );
    };

    match history.lock() {
        Ok(mut guard) => {
            if let Err(err) = guard.record(&result, now) {
                warn!("could not record '{}' in history: {}", result.question_id, err);
            }
        }
        Err(_) => warn!("history lock poisoned; '{}' not recorded", result.question_id),
    }
    info!("[bridge] answered '{}' ({:?})", result.question_id, result.status);
    warp::reply::json(&result).into_response()
}

fn handle_history<S: KeyValueStore>(history: &Mutex<CalculationHistory<S>>) -> Response {
    let Ok(guard) = history.lock() else {
        return error_reply(StatusCode::INTERNAL_SERVER_ERROR, "history unavailable");
    };
    match guard.entries() {
        Ok(entries) => warp::reply::json(&entries).into_response(),
        Err(err) => error_reply(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

/// `GET /questions`, `POST /answer`, `GET /history`.
pub fn routes<S>(
    history: SharedHistory<S>,
    metrics: Arc<MetricsRecorder>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone
where
    S: KeyValueStore + Send + 'static,
{
    let history_filter = warp::any().map(move || history.clone());
    let metrics_filter = warp::any().map(move || metrics.clone());

    let questions_route = warp::path("questions")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&QUESTIONS).into_response());

    let answer_route = warp::path("answer")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(history_filter.clone())
        .and(metrics_filter)
        .map(
            |request: AnswerRequest, history: SharedHistory<S>, metrics: Arc<MetricsRecorder>| {
                handle_answer(request, &history, metrics)
            },
        );

    let history_route = warp::path("history")
        .and(warp::path::end())
        .and(warp::get())
        .and(history_filter)
        .map(|history: SharedHistory<S>| handle_history(&history));

    questions_route
        .or(answer_route)
        .unify()
        .or(history_route)
        .unify()
}

/// Hosts the local HTTP endpoint on a background thread.
pub struct GuiBridge {
    history: SharedHistory<HistoryStore>,
    metrics: Arc<MetricsRecorder>,
}

impl GuiBridge {
    pub fn new(history: CalculationHistory<HistoryStore>) -> Self {
        Self {
            history: Arc::new(Mutex::new(history)),
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    pub fn start(&self) -> thread::JoinHandle<()> {
        let routes = routes(self.history.clone(), self.metrics.clone());
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(gui_bind_address()).await;
            });
        })
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
