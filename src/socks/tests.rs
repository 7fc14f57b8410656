mod handshake {
    use std::net::Ipv4Addr;

    use tokio_test::io;

    use super::super::*;

    const REQUEST: [u8; 11] = [4, 1, 0, 80, 93, 184, 216, 34, 97, 98, 0];

    fn target() -> ResolvedTarget {
        ResolvedTarget {
            addr: Ipv4Addr::new(93, 184, 216, 34),
            port: 80,
        }
    }

    #[tokio::test]
    async fn granted_reply_yields_a_tunnel() {
        let mut stream = io::Builder::new()
            .write(&REQUEST)
            .read(&[0, 90, 0, 0, 0, 0, 0, 0])
            .build();

        handshake(&mut stream, &target(), "ab").await.unwrap();
    }

    #[tokio::test]
    async fn every_other_code_is_a_rejection() {
        for code in [91u8, 92, 93, 0, 255] {
            let mut stream = io::Builder::new()
                .write(&REQUEST)
                .read(&[0, code, 0, 0, 0, 0, 0, 0])
                .build();

            let err = handshake(&mut stream, &target(), "ab").await.unwrap_err();

            match err {
                Errors::Rejected { code: got, .. } => assert_eq!(got, code),
                other => panic!("expected rejection, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn short_reply_is_a_read_error() {
        let mut stream = io::Builder::new().write(&REQUEST).read(&[0, 90, 0]).build();

        let err = handshake(&mut stream, &target(), "ab").await.unwrap_err();

        assert!(matches!(err, Errors::Read(_)));
    }
}

mod connect {
    use std::net::Ipv4Addr;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::super::*;

    async fn mock_proxy(reply_code: u8) -> (ProxyConfig, tokio::task::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ProxyConfig {
            proxy_addr: listener.local_addr().unwrap(),
            user_id: "tester".to_string(),
        };

        let server = tokio::spawn(async move {
            let (mut conn, _) = listener.accept().await.unwrap();
            let mut request = vec![0; 8 + "tester".len() + 1];
            conn.read_exact(&mut request).await.unwrap();
            conn.write_all(&[0, reply_code, 0, 0, 0, 0, 0, 0])
                .await
                .unwrap();
            request
        });

        (config, server)
    }

    #[tokio::test]
    async fn grants_a_tunnel_through_a_local_proxy() {
        let (config, server) = mock_proxy(v4::RESP_CODE_GRANTED).await;
        let target = ResolvedTarget {
            addr: Ipv4Addr::new(93, 184, 216, 34),
            port: 80,
        };

        let stream = connect(&config, &target).await.unwrap();
        drop(stream);

        let request = server.await.unwrap();
        assert_eq!(
            request,
            vec![4, 1, 0, 80, 93, 184, 216, 34, 116, 101, 115, 116, 101, 114, 0]
        );
    }

    #[tokio::test]
    async fn rejection_carries_the_exact_code() {
        let (config, server) = mock_proxy(v4::RESP_CODE_REJECT_OR_FAILED).await;
        let target = ResolvedTarget {
            addr: Ipv4Addr::new(192, 0, 2, 1),
            port: 443,
        };

        let err = connect(&config, &target).await.unwrap_err();

        assert!(matches!(err, Errors::Rejected { code: 91, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn dial_failure_is_a_dial_error() {
        // bind then drop, so the port has no listener
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let proxy_addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ProxyConfig {
            proxy_addr,
            user_id: "tester".to_string(),
        };
        let target = ResolvedTarget {
            addr: Ipv4Addr::new(192, 0, 2, 1),
            port: 80,
        };

        let err = connect(&config, &target).await.unwrap_err();

        assert!(matches!(err, Errors::Dial(_)));
    }
}
