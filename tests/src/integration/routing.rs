//! Single-node routing flows: name lookup, request/reply, ordering under
//! concurrent senders, and lifecycle races.

#[cfg(test)]
mod tests {
    use crate::integration::init_tracing;
    use ipc_router::{
        Destination, InstanceMask, IpcRouter, NodeId, PortName, RouterApi, RouterConfig,
        RouterError,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    const ECHO: PortName = PortName::new(0x45, 0);

    #[tokio::test]
    async fn test_echo_request_reply_via_lookup() {
        init_tracing();
        let router = Arc::new(IpcRouter::new(NodeId(0), RouterConfig::default()));

        // Server port A registers ("echo", 0).
        let a = router.create_port().unwrap();
        router.register_name(&a, ECHO).await.unwrap();

        // Client port B resolves the name.
        let b = router.create_port().unwrap();
        let resolved = router.lookup_name(ECHO, InstanceMask::ALL, 8).unwrap();
        assert_eq!(resolved, vec![a.address()]);

        // B pings A.
        router
            .send(&b, Destination::Address(resolved[0]), b"ping")
            .await
            .unwrap();
        let request = timeout(Duration::from_secs(1), router.read(&a, None))
            .await
            .expect("server read hung")
            .unwrap();
        assert_eq!(request.payload, b"ping");
        assert_eq!(request.src, b.address());

        // A pongs B back at the source address.
        router
            .send(&a, Destination::Address(request.src), b"pong")
            .await
            .unwrap();
        let reply = timeout(Duration::from_secs(1), router.read(&b, None))
            .await
            .expect("client read hung")
            .unwrap();
        assert_eq!(reply.payload, b"pong");
        assert_eq!(reply.src, a.address());
    }

    #[tokio::test]
    async fn test_per_sender_order_preserved_under_concurrency() {
        init_tracing();
        let router = Arc::new(IpcRouter::new(NodeId(0), RouterConfig::default()));
        let dest = router.create_port().unwrap();
        let dest_addr = dest.address();

        const SENDERS: u8 = 4;
        const PER_SENDER: u8 = 25;

        let mut tasks = Vec::new();
        for sender_id in 0..SENDERS {
            let router = router.clone();
            let handle = router.create_port().unwrap();
            tasks.push(tokio::spawn(async move {
                for seq in 0..PER_SENDER {
                    router
                        .send(&handle, Destination::Address(dest_addr), &[sender_id, seq])
                        .await
                        .unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // Every message arrives, and each sender's sequence stays in order.
        let mut last_seq = [None::<u8>; SENDERS as usize];
        for _ in 0..(SENDERS as usize * PER_SENDER as usize) {
            let message = timeout(Duration::from_secs(1), router.read(&dest, None))
                .await
                .expect("read hung")
                .unwrap();
            let (sender_id, seq) = match message.payload.as_slice() {
                &[sender_id, seq] => (sender_id, seq),
                other => panic!("unexpected payload shape: {other:?}"),
            };
            let slot = &mut last_seq[sender_id as usize];
            if let Some(prev) = *slot {
                assert!(seq > prev, "sender {sender_id} reordered: {prev} then {seq}");
            }
            *slot = Some(seq);
        }
        assert_eq!(
            router.try_read(&dest).await.unwrap_err(),
            RouterError::WouldBlock
        );
    }

    #[tokio::test]
    async fn test_close_while_blocked_same_context() {
        init_tracing();
        let router = Arc::new(IpcRouter::new(NodeId(0), RouterConfig::default()));
        let port = router.create_port().unwrap();

        let (read_result, close_result) = timeout(Duration::from_secs(1), async {
            tokio::join!(router.read(&port, None), async {
                tokio::task::yield_now().await;
                router.close_port(&port).await
            })
        })
        .await
        .expect("blocked read did not wake on close");

        assert_eq!(read_result.unwrap_err(), RouterError::PortClosed);
        close_result.unwrap();

        // Close again: still clean success.
        router.close_port(&port).await.unwrap();
    }

    #[tokio::test]
    async fn test_queue_full_scenario_depth_two() {
        init_tracing();
        let router = Arc::new(IpcRouter::new(
            NodeId(0),
            RouterConfig::default().with_max_queue_depth(2),
        ));
        let src = router.create_port().unwrap();
        let c = router.create_port().unwrap();
        let to = Destination::Address(c.address());

        router.send(&src, to, b"one").await.unwrap();
        router.send(&src, to, b"two").await.unwrap();
        assert_eq!(
            router.send(&src, to, b"three").await.unwrap_err(),
            RouterError::QueueFull
        );

        assert_eq!(router.read(&c, None).await.unwrap().payload, b"one");
        assert_eq!(router.read(&c, None).await.unwrap().payload, b"two");
    }
}
