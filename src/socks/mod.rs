use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

pub(crate) mod resolver;
mod v4;

use resolver::ResolvedTarget;

const DIAL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum Errors {
    #[error("Proxy Dial Failed {0:?}")]
    Dial(#[source] std::io::Error),
    #[error("Proxy Dial Timed Out {0}")]
    DialTimeout(SocketAddr),
    #[error("Request Write Failed {0:?}")]
    Write(#[source] std::io::Error),
    #[error("Reply Read Failed {0:?}")]
    Read(#[source] std::io::Error),
    #[error("Request Rejected by Proxy ({code}) {message}")]
    Rejected { code: u8, message: &'static str },
}

/// Where the proxy listens and the user-id sent in the connect request.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    pub proxy_addr: SocketAddr,
    pub user_id: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        ProxyConfig {
            proxy_addr: SocketAddr::from(([127, 0, 0, 1], 9050)),
            user_id: "torpeek".to_string(),
        }
    }
}

/// Dial the proxy and request a tunnel to `target`.
///
/// On a granted reply the returned stream is a plain bidirectional pipe to
/// the target; no further protocol framing happens on it. Every failure is
/// terminal and drops (closes) the proxy connection.
pub(crate) async fn connect(
    config: &ProxyConfig,
    target: &ResolvedTarget,
) -> Result<TcpStream, Errors> {
    let mut stream = tokio::time::timeout(DIAL_TIMEOUT, TcpStream::connect(config.proxy_addr))
        .await
        .map_err(|_| Errors::DialTimeout(config.proxy_addr))?
        .map_err(Errors::Dial)?;

    debug!(proxy = %config.proxy_addr, "connected to proxy");

    handshake(&mut stream, target, &config.user_id).await?;

    debug!(addr = %target.addr, port = target.port, "tunnel established");

    Ok(stream)
}

async fn handshake(
    stream: &mut (impl AsyncRead + AsyncWrite + Unpin),
    target: &ResolvedTarget,
    user_id: &str,
) -> Result<(), Errors> {
    let request = v4::Request::connect(target.addr, target.port, user_id);

    stream
        .write_all(&request.to_buf())
        .await
        .map_err(Errors::Write)?;
    stream.flush().await.map_err(Errors::Write)?;

    let reply = v4::Reply::read(stream).await.map_err(Errors::Read)?;

    match v4::ReplyCode::try_from(reply.code) {
        Ok(v4::ReplyCode::Granted) => Ok(()),
        _ => Err(Errors::Rejected {
            code: reply.code,
            message: v4::reply_text(reply.code),
        }),
    }
}

#[cfg(test)]
mod tests;
