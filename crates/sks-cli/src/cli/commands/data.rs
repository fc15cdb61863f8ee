//! Read-only data commands; each prints the unwrapped response data as JSON.

use anyhow::{Context as _, Result};
use serde_json::Value;
use sks_core::api::ApiResult;
use sks_core::context::Context;
use url::form_urlencoded;

fn print_data(result: ApiResult<Value>, what: &str) -> Result<()> {
    let data = result.with_context(|| format!("fetch {what}"))?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

pub async fn scripts_list(ctx: &Context, status: Option<&str>) -> Result<()> {
    print_data(ctx.api.scripts().list(status).await, "scripts")
}

pub async fn scripts_hot(ctx: &Context, limit: u32) -> Result<()> {
    print_data(ctx.api.scripts().hot(limit).await, "hot scripts")
}

pub async fn scripts_show(ctx: &Context, id: &str) -> Result<()> {
    print_data(ctx.api.scripts().get(id).await, &format!("script {id}"))
}

pub async fn orders_mine(ctx: &Context) -> Result<()> {
    print_data(ctx.api.orders().mine().await, "orders")
}

pub async fn locks_mine(ctx: &Context) -> Result<()> {
    print_data(ctx.api.locks().mine().await, "locks")
}

pub async fn api_get(ctx: &Context, path: &str) -> Result<()> {
    let (path, pairs) = split_query(path);
    let query: Vec<(&str, String)> = pairs
        .iter()
        .map(|(key, value)| (key.as_str(), value.clone()))
        .collect();
    print_data(ctx.api.get(path, &query).await, path)
}

/// Splits `path?a=1&b=2` into the path and its decoded query pairs; the
/// client re-encodes them on the way out.
fn split_query(raw: &str) -> (&str, Vec<(String, String)>) {
    let Some((path, query)) = raw.split_once('?') else {
        return (raw, Vec::new());
    };
    let pairs = form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    (path, pairs)
}
