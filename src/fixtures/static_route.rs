//! Routes that always answer with the same envelope.

use std::future::ready;

use serde_json::Value;

use crate::config::RouteConfig;
use crate::envelope::Envelope;
use crate::error::MockResult;
use crate::handler::{with_latency, Latency};
use crate::routing::{Method, Params, RouteTable};

/// Envelope described by a route entry.
pub fn envelope_for(route: &RouteConfig) -> Envelope {
    Envelope::fail(route.code, route.message.clone()).with_data(route.data.clone())
}

/// Register one fixed-response route.
pub fn mount(table: &mut RouteTable, route: &RouteConfig, latency: Latency) -> MockResult<()> {
    let method: Method = route.method.parse()?;
    let envelope = envelope_for(route);
    table.register(
        method,
        &route.path,
        with_latency(
            move |_params: Params, _body: Value| ready(MockResult::Ok(envelope.clone())),
            latency,
        ),
    )?;
    Ok(())
}
