use std::sync::OnceLock;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use tera::{Context, Tera};

use crate::api::AppState;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

fn templates() -> &'static Tera {
    static TERA: OnceLock<Tera> = OnceLock::new();
    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_template("index.html", INDEX_TEMPLATE)
            .expect("bundled index template must parse");
        tera
    })
}

/// Landing page with catalog stats; the interactive demo form lives under
/// `/demo`.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let snapshot = state.store.current();

    let mut context = Context::new();
    context.insert("dataset_rows", &snapshot.len());
    context.insert("catalog_source", snapshot.source());
    context.insert("loaded_at", &snapshot.loaded_at().to_rfc3339());

    templates()
        .render("index.html", &context)
        .map(Html)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
