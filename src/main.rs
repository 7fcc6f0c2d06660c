use rust_router::config::{self, Config};
use rust_router::server::{self, ServeOptions};
use rust_router::{logger, Router};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Worker threads from config, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let router = build_router(&cfg);

    logger::log_info(&format!(
        "Registered {} routes and {} static mounts",
        router.routes().len(),
        router.mounts().len()
    ));

    server::listen(router, addr, ServeOptions::from_config(&cfg), |bound| {
        logger::log_server_start(&bound, &cfg);
    })
    .await?;
    Ok(())
}

/// Demo application routes
fn build_router(cfg: &Config) -> Router {
    let mut app = Router::with_static_root(&cfg.static_files.root, &cfg.static_files.default_mount);
    app.set_fallback_homepage(cfg.http.fallback_homepage);

    app.get("/", |_, res| {
        res.send(200, "Welcome to the home page");
    })
    .get("/about", |_, res| {
        res.json(200, &json!({ "message": "Welcome to the about page" }));
    })
    .get("/user/:id", |req, res| match req.param("id") {
        Some(id) => res.json(200, &json!({ "id": id })),
        None => res.send(400, "missing user id"),
    })
    .post("/submit", |_, res| {
        res.json(201, &json!({ "status": "success", "message": "Data received" }));
    })
    .put("/update", |_, res| {
        res.send(200, "Resource updated");
    })
    .patch("/update/:field", |req, res| {
        let field = req.param("field").unwrap_or_default();
        res.send(200, format!("Field '{field}' patched"));
    })
    .delete("/delete", |_, res| {
        res.set_headers(204, [("X-Deleted", "true")]);
        res.end_empty();
    });

    app
}
