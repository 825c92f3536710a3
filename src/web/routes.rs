use std::sync::Arc;
use warp::{filters::BoxedFilter, http::Uri, Filter, Reply};

use super::State;

pub fn router(state: Arc<State>) -> BoxedFilter<(impl Reply,)> {
    index()
        .or(crate::api::api(Arc::clone(&state)))
        .with(warp::trace::request())
        .boxed()
}

fn index() -> BoxedFilter<(impl Reply,)> {
    let route = warp::path::end().map(|| warp::redirect(Uri::from_static("/api/health")));
    warp::get().and(route).boxed()
}
