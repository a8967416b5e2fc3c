use std::env;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use nano_http::handler::make_handler;
use nano_http::protocol::status;
use nano_http::server::{Server, ServerRequest, ServerResponse};
use nano_http::BoxError;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut args = env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| "127.0.0.1:8080".to_owned());
    let doc_root = args.next().unwrap_or_else(|| "./doc".to_owned());

    // GET serves files from the document root, PUT stores them there;
    // /Greeting shows a registered handler.
    let mut server = Server::bind(&addr, doc_root).await?;
    server.register("GET", "/Greeting", Arc::new(make_handler(greeting)));

    server.run().await?;
    Ok(())
}

async fn greeting(_request: ServerRequest, mut response: ServerResponse) -> Result<ServerResponse, BoxError> {
    response.set_code(status::OK);
    response.set_content_type("text/html");
    response
        .write(b"<html><head><title>Greeting</title></head><body><h1>Hello, world.</h1></body></html>")
        .await?;
    Ok(response)
}
