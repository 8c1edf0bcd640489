use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::{AppConfig, UPLOADS_PUBLIC_PREFIX};
use crate::routes::{pages::page_routes, stubs::stub_routes};
use crate::state::AppState;
use crate::{attendance, users};

pub fn build_app(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.qr.upload_dir);

    Router::new()
        .merge(page_routes())
        .merge(attendance::router())
        .merge(users::router())
        .merge(stub_routes())
        .route("/health", get(|| async { "ok" }))
        .nest_service(UPLOADS_PUBLIC_PREFIX, uploads)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod app_tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    use super::*;
    use crate::qr::bootstrap_shared_qr;
    use crate::state::test_config;
    use crate::storage::{AssetStore, LocalStore};

    #[tokio::test]
    async fn health() {
        let (st, _) = AppState::for_tests("http://kiosk.local").await;
        let res = build_app(st)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn generated_qr_images_are_served() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config("http://kiosk.local");
        config.qr.upload_dir = dir.path().to_path_buf();
        let store = Arc::new(LocalStore::new(dir.path())) as Arc<dyn AssetStore>;
        bootstrap_shared_qr(store.as_ref(), &config).await.unwrap();

        let st = AppState::from_parts(crate::db::in_memory().await, Arc::new(config), store);
        let app = build_app(st);

        let add = app
            .clone()
            .oneshot(
                Request::post("/user/add")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("name=Ali+Rezaei"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(add.status(), StatusCode::OK);

        for uri in ["/static/uploads/attendance_qr.png", "/static/uploads/user_1.png"] {
            let res = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK, "{}", uri);
            let png = res.into_body().collect().await.unwrap().to_bytes();
            assert!(png.starts_with(b"\x89PNG"));
        }
    }
}
