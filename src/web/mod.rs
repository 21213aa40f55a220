mod error;
mod handlers;
mod pages;
mod state;

use anyhow::{Context, Result};
use actix_web::web::{self as aw, Data, ServiceConfig};
use actix_web::{App, HttpServer};
use tracing::info;

use crate::config::WebConfig;
use state::AppState;

/// 업로드, 편집, 다운로드 라우트를 등록한다.
pub fn routes(cfg: &mut ServiceConfig) {
    cfg.service(
        aw::resource("/")
            .route(aw::get().to(handlers::index))
            .route(aw::post().to(handlers::upload)),
    )
    .service(
        aw::resource("/edit/{token}")
            .route(aw::get().to(handlers::edit_form))
            .route(aw::post().to(handlers::save)),
    );
}

/// 웹 인터페이스를 실행한다. 서버가 멈출 때까지 블록된다.
/// 업로드 루트는 임시 디렉토리이며 종료 시 삭제된다.
pub fn serve(cfg: &WebConfig) -> Result<()> {
    let uploads = tempfile::Builder::new()
        .prefix("copyrighter-")
        .tempdir()
        .context("cannot create upload directory")?;
    let state = Data::new(AppState::new(
        uploads.path().to_path_buf(),
        cfg.max_upload_bytes(),
    ));

    info!(
        host = %cfg.host,
        port = cfg.port,
        uploads = %uploads.path().display(),
        "starting web interface"
    );
    println!("Open http://{}:{} in your browser", cfg.host, cfg.port);

    let addr = (cfg.host.clone(), cfg.port);
    actix_web::rt::System::new()
        .block_on(async move {
            HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
                .bind(addr)?
                .run()
                .await
        })
        .with_context(|| format!("web server on {}:{} failed", cfg.host, cfg.port))?;

    uploads.close().context("cannot remove upload directory")?;
    info!("web interface stopped");
    Ok(())
}
