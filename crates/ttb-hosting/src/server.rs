use std::sync::Arc;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;

use ttb_gameroom::Lobby;
use ttb_store::StateStore;

use crate::gateway::Gateway;
use crate::session;

/// HTTP + WebSocket surface for the closed message set (spec §4.7). A
/// single `/ws` route upgrades to the per-connection bridge in
/// `session::run`; `/healthz` is a plain liveness probe for the admin
/// surface spec §1 treats as an external collaborator.
pub struct Server;

impl Server {
    pub async fn run(port: u16, lobby: Arc<Lobby>, store: Arc<dyn StateStore>) -> std::io::Result<()> {
        let gateway = Arc::new(Gateway::new(lobby));
        gateway.start_fanout(&store).await;
        let data = web::Data::new(gateway);

        log::info!("starting tetris battle gateway on port {port}");
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
                .app_data(data.clone())
                .route("/healthz", web::get().to(healthz))
                .route("/ws", web::get().to(websocket))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

async fn healthz() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

async fn websocket(
    gateway: web::Data<Arc<Gateway>>,
    req: HttpRequest,
    body: web::Payload,
) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            let gateway = gateway.get_ref().clone();
            actix_web::rt::spawn(session::run(gateway, session, stream));
            response.map_into_left_body()
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()).map_into_right_body(),
    }
}
