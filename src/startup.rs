use std::{net::TcpListener, path::PathBuf, sync::Arc};

use actix_cors::Cors;
use actix_files::Files;
use actix_multipart::form::MultipartFormConfig;
use actix_web::{
    dev::Server,
    http::header,
    middleware::Logger,
    web::{self, Data},
    App, HttpServer,
};

use crate::{
    error::AnalyzeError,
    routes::{analyze_route, default_route, StaticDir},
    services::{AgentRuntime, Narrator},
};

pub fn run(
    listener: TcpListener,
    agent: Arc<dyn AgentRuntime>,
    narrator: Arc<dyn Narrator>,
    static_dir: PathBuf,
    max_upload_bytes: usize,
) -> Result<Server, std::io::Error> {
    let agent: Data<dyn AgentRuntime> = Data::from(agent);
    let narrator: Data<dyn Narrator> = Data::from(narrator);
    let static_files = static_dir.clone();
    let static_dir = web::Data::new(StaticDir(static_dir));

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_header(header::CONTENT_TYPE)
            .max_age(3600);

        let multipart_config = MultipartFormConfig::default()
            .total_limit(max_upload_bytes)
            .error_handler(|err, _req| {
                AnalyzeError::Validation(format!("Invalid upload: {}", err)).into()
            });

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .service(Files::new("/static", static_files.clone()).prefer_utf8(true))
            .service(default_route::index)
            .service(default_route::health_check)
            .service(analyze_route::analyze)
            .app_data(multipart_config)
            .app_data(agent.clone())
            .app_data(narrator.clone())
            .app_data(static_dir.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
