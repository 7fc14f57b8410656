pub(crate) mod socks;

use anyhow::Context;
use clap::{ArgGroup, Parser};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use socks::ProxyConfig;

/// Issue one HTTP HEAD request to a target through a SOCKS4 proxy.
#[derive(Parser, Debug)]
#[command(name = "torpeek", about = "HTTP HEAD through a SOCKS4 proxy", long_about = None)]
#[command(group = ArgGroup::new("target").required(true).args(["url", "ip"]))]
struct Args {
    /// Target hostname, resolved to its first IPv4 address
    #[arg(short = 'u', long)]
    url: Option<String>,

    /// Target IP address, used as-is (takes precedence over --url)
    #[arg(short = 'i', long)]
    ip: Option<String>,

    /// Target port
    #[arg(short = 'p', long, value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let format = tracing_subscriber::fmt::format()
        .without_time()
        .with_level(false)
        .with_target(false)
        .pretty()
        .with_source_location(false);
    tracing_subscriber::fmt()
        .event_format(format)
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let host = args.ip.as_deref().or(args.url.as_deref()).unwrap();

    let target = socks::resolver::resolve(host, args.port).await?;

    let stream = socks::connect(&ProxyConfig::default(), &target).await?;

    let response = head_request(stream, host).await?;
    println!("{response}");

    Ok(())
}

/// Send one HEAD request on the tunnel and collect one read of the response.
///
/// The response is not parsed; whatever arrives in the first 4096 bytes is
/// returned verbatim. A peer close before any data is an empty response, not
/// an error.
async fn head_request(mut stream: TcpStream, host: &str) -> anyhow::Result<String> {
    let request = format!("HEAD / HTTP/1.1\r\nHost: {host}\r\n\r\n");
    stream
        .write_all(request.as_bytes())
        .await
        .context("failed to send http request")?;

    debug!(host, "http request sent");

    let mut buf = vec![0; 4096];
    let n = stream
        .read(&mut buf)
        .await
        .context("failed to read http response")?;

    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}
