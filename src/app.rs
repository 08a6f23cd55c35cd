//! Built-in sample application.
//!
//! These endpoints exist to exercise the kernel end to end: direct traces,
//! in-process child spans, chained loopback calls that hop the network
//! boundary, path parameters, and locator delegation. The integration tests
//! drive them over real TCP connections.

use crate::modules::http::response::Response;
use crate::modules::router::error::RouterResult;
use crate::modules::router::route::{handler_fn, ParamSpec, Route};
use crate::modules::router::table::RouteTable;

/// Build the sample route table.
pub fn routes() -> RouterResult<RouteTable> {
    RouteTable::builder()
        .route(
            Route::get("/")
                .produces("application/json")
                .handler(handler_fn(|_ctx| async {
                    Ok(Response::ok().json(r#"{"message":"Root"}"#).build())
                }))
                .build()?,
        )
        .route(
            Route::get("/direct")
                .produces("application/json")
                .handler(handler_fn(|_ctx| async {
                    Ok(Response::ok().json(r#"{"message":"Direct trace"}"#).build())
                }))
                .build()?,
        )
        .route(
            Route::get("/chained")
                .produces("application/json")
                .handler(handler_fn(|ctx| async move {
                    let span = ctx.trace.internal_span("ChainService.call");
                    ctx.trace.finish(span);
                    Ok(Response::ok().json(r#"{"message":"Chained trace"}"#).build())
                }))
                .build()?,
        )
        .route(
            Route::get("/nopath")
                .produces("application/json")
                .handler(handler_fn(|ctx| async move {
                    let url = format!("http://{}", ctx.local_authority);
                    ctx.client.get(&url, &ctx.trace.context()).await?;
                    Ok(Response::ok().json(r#"{"message":"No path trace"}"#).build())
                }))
                .build()?,
        )
        .route(
            Route::get("/slashpath")
                .produces("application/json")
                .handler(handler_fn(|ctx| async move {
                    let url = format!("http://{}/", ctx.local_authority);
                    ctx.client.get(&url, &ctx.trace.context()).await?;
                    Ok(Response::ok().json(r#"{"message":"No path trace"}"#).build())
                }))
                .build()?,
        )
        .route(
            Route::get("/deep/path")
                .produces("application/json")
                .blocking()
                .handler(handler_fn(|_ctx| async {
                    Ok(Response::ok().json(r#"{"message":"Deep url path"}"#).build())
                }))
                .build()?,
        )
        .route(
            Route::get("/param/{paramId}")
                .produces("application/json")
                .param(ParamSpec::path("paramId"))
                .handler(handler_fn(|ctx| async move {
                    let id = ctx.param("paramId").unwrap_or("").to_string();
                    Ok(Response::ok()
                        .json(format!(r#"{{"message":"ParameterId: {id}"}}"#))
                        .build())
                }))
                .build()?,
        )
        .route(
            Route::get("/client/ping/{message}")
                .produces("text/plain")
                .param(ParamSpec::path("message"))
                .handler(handler_fn(|ctx| async move {
                    let message = ctx.param("message").unwrap_or("").to_string();
                    let url = ctx.local_url(&format!("/client/pong/{message}"));
                    let reply = ctx.client.get(&url, &ctx.trace.context()).await?;
                    let body = String::from_utf8_lossy(reply.body()).to_string();
                    Ok(Response::ok().text(body).build())
                }))
                .build()?,
        )
        .route(
            Route::get("/client/async-ping/{message}")
                .produces("text/plain")
                .param(ParamSpec::path("message"))
                .asynchronous()
                .handler(handler_fn(|ctx| async move {
                    let message = ctx.param("message").unwrap_or("").to_string();
                    let url = ctx.local_url(&format!("/client/pong/{message}"));
                    let reply = ctx.client.get(&url, &ctx.trace.context()).await?;
                    let body = String::from_utf8_lossy(reply.body()).to_string();
                    Ok(Response::ok().text(body).build())
                }))
                .build()?,
        )
        .route(
            Route::get("/client/pong/{message}")
                .produces("text/plain")
                .param(ParamSpec::path("message"))
                .handler(handler_fn(|ctx| async move {
                    let message = ctx.param("message").unwrap_or("").to_string();
                    Ok(Response::ok().text(format!("pong {message}")).build())
                }))
                .build()?,
        )
        .route(Route::locator("/template").delegate("template-resource").build()?)
        .group(
            "template-resource",
            vec![Route::get("/path/{value}")
                .produces("text/plain")
                .param(ParamSpec::path("value"))
                .handler(handler_fn(|ctx| async move {
                    let value = ctx.param("value").unwrap_or("").to_string();
                    Ok(Response::ok().text(format!("Received: {value}")).build())
                }))
                .build()?],
        )
        .build()
}
