use criterion::{criterion_group, criterion_main, Criterion};
use futures::stream;

use pico_http::handler::make_handler;
use pico_http::protocol::{FragmentStream, Method};
use pico_http::router::{Route, Router};

fn noop_route(method: Method, path: &str) -> Route {
    Route::new(method, path, || {
        make_handler(|_request, _cancel| async {
            Ok(Box::pin(stream::empty()) as FragmentStream)
        })
    })
}

fn build_router() -> Router {
    let mut router = Router::new();
    router.add_route(noop_route(Method::Get, "/"));
    router.add_route(noop_route(Method::Get, "/api/users"));
    router.add_route(noop_route(Method::Post, "/api/users"));
    router.add_route(noop_route(Method::Get, "/api/users/posts"));
    router.add_route(noop_route(Method::Get, "/api/orders"));
    router.add_route(noop_route(Method::Get, "/static"));
    router
}

fn bench_match_route(c: &mut Criterion) {
    let router = build_router();

    c.bench_function("match static leaf", |b| {
        b.iter(|| router.match_route(Method::Get, "/api/users/posts"))
    });

    c.bench_function("match with positional params", |b| {
        b.iter(|| router.match_route(Method::Get, "/api/users/42/avatar"))
    });

    c.bench_function("match miss", |b| {
        b.iter(|| router.match_route(Method::Get, "/metrics/cpu"))
    });
}

criterion_group!(benches, bench_match_route);
criterion_main!(benches);
