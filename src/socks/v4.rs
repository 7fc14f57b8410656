// https://www.openssh.com/txt/socks4.protocol

use std::net::Ipv4Addr;

use tokio::io::{AsyncRead, AsyncReadExt};

pub const VERSION: u8 = 4;

pub const METHOD_CONNECT: u8 = 1;

pub const RESP_CODE_GRANTED: u8 = 90;
pub const RESP_CODE_REJECT_OR_FAILED: u8 = 91;
pub const RESP_CODE_IDENTD_UNREACHABLE: u8 = 92;
pub const RESP_CODE_IDENTD_MISMATCH: u8 = 93;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, int_enum::IntEnum)]
pub enum ReplyCode {
    Granted = RESP_CODE_GRANTED,
    RejectedOrFailed = RESP_CODE_REJECT_OR_FAILED,
    IdentdUnreachable = RESP_CODE_IDENTD_UNREACHABLE,
    IdentdMismatch = RESP_CODE_IDENTD_MISMATCH,
}

pub fn reply_text(code: u8) -> &'static str {
    match ReplyCode::try_from(code) {
        Ok(ReplyCode::Granted) => "request granted",
        Ok(ReplyCode::RejectedOrFailed) => "request rejected or failed",
        Ok(ReplyCode::IdentdUnreachable) => "proxy cannot reach identd on this host",
        Ok(ReplyCode::IdentdMismatch) => "identd reported a different user-id",
        Err(_) => "unassigned reply code",
    }
}

/// A CONNECT request. The user-id field is variable-length on the wire and
/// always carries exactly one trailing null terminator.
pub struct Request {
    pub dest_port: u16,
    pub dest_ip: Ipv4Addr,
    pub user_id: String,
}

impl Request {
    pub fn connect(dest_ip: Ipv4Addr, dest_port: u16, user_id: &str) -> Request {
        Request {
            dest_port,
            dest_ip,
            user_id: user_id.to_string(),
        }
    }

    pub fn to_buf(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + self.user_id.len() + 1);
        buf.push(VERSION);
        buf.push(METHOD_CONNECT);
        buf.extend_from_slice(&self.dest_port.to_be_bytes());
        buf.extend_from_slice(&self.dest_ip.octets());
        buf.extend_from_slice(self.user_id.as_bytes());
        buf.push(0);
        buf
    }
}

/// The fixed 8-byte reply. The trailing destination port and address are
/// only meaningful for BIND, so they are read and discarded.
#[derive(Debug)]
pub struct Reply {
    pub version: u8,
    pub code: u8,
}

impl Reply {
    pub async fn read(stream: &mut (impl AsyncRead + Unpin)) -> std::io::Result<Reply> {
        let mut buf: [u8; 8] = [0; 8];
        stream.read_exact(&mut buf).await?;

        Ok(Reply {
            version: buf[0],
            code: buf[1],
        })
    }
}
