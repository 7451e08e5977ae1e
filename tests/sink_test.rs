mod common;

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::post;
use common::serve;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tariffwatch::Tariff;
use tariffwatch::error::TariffWatchError;
use tariffwatch::sink::{InfluxSink, MetricPoint, MetricsSink};

type Writes = Arc<Mutex<Vec<(HashMap<String, String>, String)>>>;

async fn influx(status: StatusCode, reply: &'static str, writes: Writes) -> String {
    let app = Router::new().route(
        "/write",
        post(
            move |Query(params): Query<HashMap<String, String>>, body: String| {
                let writes = Arc::clone(&writes);
                async move {
                    writes.lock().unwrap().push((params, body));
                    (status, reply)
                }
            },
        ),
    );
    serve(app).await
}

fn point() -> MetricPoint {
    let mut tariff = Tariff::default();
    tariff.spot_price_electricity_kwh = 0.15;
    MetricPoint::from_tariff(&tariff.derive(), "easyenergy", "easyenergy")
}

#[tokio::test]
async fn writes_point_to_database() {
    let writes: Writes = Arc::default();
    let base = influx(StatusCode::NO_CONTENT, "", Arc::clone(&writes)).await;

    let sink = InfluxSink::new(&base, "telegraf").unwrap();
    sink.write(&point()).await.unwrap();

    let writes = writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    let (params, body) = &writes[0];
    assert_eq!(params["db"], "telegraf");
    assert!(body.starts_with("easyenergy,source=easyenergy "));
    assert!(body.contains("spot_price_electricity_kwh=0.15"));
    assert!(!body.contains('\n'));
}

#[tokio::test]
async fn rejected_write_is_sink_error() {
    let base = influx(
        StatusCode::NOT_FOUND,
        r#"{"error":"database not found: \"telegraf\""}"#,
        Arc::default(),
    )
    .await;
    let sink = InfluxSink::new(&base, "telegraf").unwrap();
    let err = sink.write(&point()).await.unwrap_err();
    assert!(matches!(err, TariffWatchError::Sink { .. }), "{err}");
}

#[tokio::test]
async fn unreachable_backend_is_sink_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let sink = InfluxSink::new(&format!("http://{}", addr), "telegraf").unwrap();
    let err = sink.write(&point()).await.unwrap_err();
    assert!(matches!(err, TariffWatchError::Sink { .. }), "{err}");
}
