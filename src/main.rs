use std::io;

use line_http::{Request, Server, make_handler};
use tokio::io::AsyncWriteExt;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let server = Server::new("0.0.0.0:9999");
    server.register("/ping", make_handler(ping));
    server.register("/echo", make_handler(echo));

    info!(addr = server.addr(), "starting server");
    if let Err(e) = server.start().await {
        error!(cause = %e, "server exited");
    }
}

async fn ping(mut request: Request) -> io::Result<()> {
    write_text(&mut request, "pong").await
}

/// Echoes back every `message` query value, one per line.
async fn echo(mut request: Request) -> io::Result<()> {
    let body = request.query_params().get_all("message").join("\n");
    write_text(&mut request, &body).await
}

async fn write_text(request: &mut Request, body: &str) -> io::Result<()> {
    let response = format!("HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{body}", body.len());
    request.write_all(response.as_bytes()).await
}
