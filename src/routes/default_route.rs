use std::path::PathBuf;

use actix_files::NamedFile;
use actix_web::{get, web, HttpResponse, Responder};

pub struct StaticDir(pub PathBuf);

#[get("/")]
async fn index(static_dir: web::Data<StaticDir>) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open_async(static_dir.0.join("index.html")).await?)
}

#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().finish()
}
