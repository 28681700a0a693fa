//! Batch executor integration tests
//!
//! Runs the executor against a stub backend and checks ordering, error
//! tolerance, header and body handling, and cancellation.

#[cfg(test)]
mod tests {
    use crate::common::assertions::{BatchResultAssertions, result_header};
    use crate::common::backend::{received_count, reply, stub};
    use crate::common::fixtures::{payload_of, sample_document};
    use crate::common::{OperationFactory, executor_for, recording_executor};
    use crate::{assert_err, assert_ok};
    use batch_gateway::{
        BatchError, BatchExecutor, BatchPayload, ExecutionContext, NoopLogger, Operation,
        OperationError, TraceHook,
    };
    use reqwest::header::HeaderMap;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // ==================== Ordering and limits ====================

    #[tokio::test]
    async fn test_full_batch_preserves_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(5)
            .mount(&server)
            .await;

        let outcome = executor_for(&server)
            .process(&ExecutionContext::background(), payload_of(5))
            .await;

        let result = assert_ok!(outcome.into_result());
        result.assert_bulk_ids(&["0", "1", "2", "3", "4"]);
        result.assert_all_status(200);

        let requests = server.received_requests().await.unwrap();
        let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
        assert_eq!(paths, vec!["/items/0", "/items/1", "/items/2", "/items/3", "/items/4"]);
    }

    #[tokio::test]
    async fn test_too_many_operations_makes_no_calls() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = executor_for(&server)
            .process(&ExecutionContext::background(), payload_of(1025))
            .await;

        assert!(outcome.payload.is_empty());
        let err = assert_err!(outcome.into_result());
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Maximum number of operations exceeded: 1025 > 1024"
        );
        assert_eq!(received_count(&server).await, 0);
    }

    #[tokio::test]
    async fn test_exactly_cap_operations_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(reply(200))
            .mount(&server)
            .await;

        let executor = executor_for(&server).with_max_operations(3);
        let outcome = executor
            .process(&ExecutionContext::background(), payload_of(3))
            .await;
        assert!(outcome.is_complete());
        assert_eq!(outcome.payload.len(), 3);

        let outcome = executor
            .process(&ExecutionContext::background(), payload_of(4))
            .await;
        assert!(matches!(
            outcome.error,
            Some(BatchError::TooManyOperations { count: 4, limit: 3 })
        ));
    }

    #[tokio::test]
    async fn test_empty_batch_is_complete() {
        let server = MockServer::start().await;
        let outcome = executor_for(&server)
            .process(&ExecutionContext::background(), BatchPayload::default())
            .await;
        assert!(outcome.is_complete());
        assert!(outcome.payload.is_empty());
    }

    // ==================== Error tolerance ====================

    #[tokio::test]
    async fn test_zero_tolerance_aborts_on_first_failure() {
        let server = MockServer::start().await;
        stub(&server, "GET", "/items/0", reply(500), 1).await;
        stub(&server, "GET", "/items/1", reply(200), 0).await;

        let payload = payload_of(2).fail_on_errors(0);
        let outcome = executor_for(&server)
            .process(&ExecutionContext::background(), payload)
            .await;

        assert_eq!(outcome.payload.len(), 1);
        assert_eq!(outcome.payload.operations[0].status_code(), Some(500));
        match outcome.error {
            Some(BatchError::Aborted {
                index: 0,
                failures: 1,
                source: OperationError::UnsuccessfulStatus(500),
            }) => {}
            other => panic!("unexpected outcome error: {:?}", other),
        }
        assert_eq!(received_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_zero_tolerance_continues_while_successful() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(reply(201))
            .mount(&server)
            .await;

        let outcome = executor_for(&server)
            .process(&ExecutionContext::background(), payload_of(3).fail_on_errors(0))
            .await;
        assert!(outcome.is_complete());
        assert_eq!(outcome.payload.len(), 3);
    }

    #[tokio::test]
    async fn test_tolerance_two_stops_at_second_failure() {
        let server = MockServer::start().await;
        stub(&server, "GET", "/a", reply(404), 1).await;
        stub(&server, "GET", "/b", reply(200), 1).await;
        stub(&server, "GET", "/c", reply(503), 1).await;
        stub(&server, "GET", "/d", reply(200), 0).await;

        let payload = BatchPayload::new(vec![
            OperationFactory::get("/a", "A"),
            OperationFactory::get("/b", "B"),
            OperationFactory::get("/c", "C"),
            OperationFactory::get("/d", "D"),
        ])
        .fail_on_errors(2);

        let (executor, logger) = recording_executor(&server);
        let outcome = executor
            .process(&ExecutionContext::background(), payload)
            .await;

        outcome.payload.assert_bulk_ids(&["A", "B", "C"]);
        assert_eq!(outcome.payload.operations[0].status_code(), Some(404));
        assert_eq!(outcome.payload.operations[2].status_code(), Some(503));
        assert!(matches!(
            outcome.error,
            Some(BatchError::Aborted { index: 2, failures: 2, .. })
        ));

        assert_eq!(logger.count("info"), 3);
        assert_eq!(logger.count("warn"), 1);
        assert_eq!(logger.count("error"), 1);
    }

    #[tokio::test]
    async fn test_unbounded_tolerance_never_aborts() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(reply(500))
            .expect(4)
            .mount(&server)
            .await;

        let outcome = executor_for(&server)
            .process(&ExecutionContext::background(), payload_of(4))
            .await;

        assert!(outcome.is_complete());
        outcome.payload.assert_all_status(500);
    }

    #[tokio::test]
    async fn test_redirect_counts_as_failure() {
        let server = MockServer::start().await;
        stub(
            &server,
            "GET",
            "/moved",
            ResponseTemplate::new(302).insert_header("Location", "/elsewhere"),
            1,
        )
        .await;
        stub(&server, "GET", "/elsewhere", ResponseTemplate::new(200), 0).await;

        let payload =
            BatchPayload::new(vec![OperationFactory::get("/moved", "m")]).fail_on_errors(1);
        let outcome = executor_for(&server)
            .process(&ExecutionContext::background(), payload)
            .await;

        assert_eq!(outcome.payload.operations[0].status_code(), Some(302));
        assert!(outcome.error.is_some());
    }

    // ==================== Transport failures ====================

    #[tokio::test]
    async fn test_unreachable_backend_is_failure_without_status() {
        let executor = BatchExecutor::new("http://127.0.0.1:1", Arc::new(NoopLogger));
        let payload = BatchPayload::new(vec![
            OperationFactory::get("/x", "x"),
            OperationFactory::get("/y", "y"),
        ])
        .fail_on_errors(1);

        let outcome = executor
            .process(&ExecutionContext::background(), payload)
            .await;

        assert_eq!(outcome.payload.len(), 1);
        let result = &outcome.payload.operations[0];
        assert_eq!(result.bulk_id, "x");
        assert!(result.status.is_none());
        assert!(result.headers.is_empty());
        assert!(matches!(
            outcome.error.as_ref().and_then(BatchError::operation_error),
            Some(OperationError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_deadline_aborts_slow_call() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let ctx = ExecutionContext::background().with_timeout(Duration::from_millis(100));
        let payload = payload_of(2).fail_on_errors(1);

        let started = std::time::Instant::now();
        let outcome = executor_for(&server).process(&ctx, payload).await;

        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(outcome.payload.len(), 1);
        assert!(outcome.payload.operations[0].status.is_none());
        assert!(matches!(
            outcome.error.as_ref().and_then(BatchError::operation_error),
            Some(OperationError::DeadlineExceeded)
        ));
    }

    #[tokio::test]
    async fn test_cancellation_fails_remaining_operations() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let (ctx, handle) = ExecutionContext::background().with_cancel();
        let executor = executor_for(&server);
        let task = tokio::spawn(async move { executor.process(&ctx, payload_of(3)).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
        let outcome = task.await.unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.payload.len(), 3);
        assert!(outcome.payload.operations.iter().all(|o| o.status.is_none()));
        assert_eq!(received_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_non_json_body_is_parse_failure() {
        let server = MockServer::start().await;
        stub(
            &server,
            "GET",
            "/text",
            ResponseTemplate::new(200).set_body_string("plain text"),
            1,
        )
        .await;

        let payload = BatchPayload::new(vec![OperationFactory::get("/text", "t")]).fail_on_errors(1);
        let outcome = executor_for(&server)
            .process(&ExecutionContext::background(), payload)
            .await;

        let result = &outcome.payload.operations[0];
        assert_eq!(result.status_code(), Some(200));
        assert!(result.body.is_none());
        assert!(matches!(
            outcome.error.as_ref().and_then(BatchError::operation_error),
            Some(OperationError::BodyParse { status: 200, .. })
        ));
    }

    // ==================== Headers and bodies ====================

    #[tokio::test]
    async fn test_request_headers_forwarded_in_order() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let operation = Operation::new("DELETE", "/items/9")
            .with_header("X-Dup", "first")
            .with_header("Accept", "application/json")
            .with_header("X-Dup", "second");
        executor_for(&server)
            .process(
                &ExecutionContext::background(),
                BatchPayload::new(vec![operation]),
            )
            .await;

        let requests = server.received_requests().await.unwrap();
        let request = &requests[0];
        assert_eq!(request.method.as_str(), "DELETE");
        let dups: Vec<&str> = request
            .headers
            .get_all("x-dup")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(dups, vec!["first", "second"]);
        assert_eq!(
            request.headers.get("accept").unwrap().to_str().unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_multi_valued_response_headers_are_joined() {
        let server = MockServer::start().await;
        stub(
            &server,
            "GET",
            "/multi",
            ResponseTemplate::new(200)
                .append_header("X-Multi", "a")
                .append_header("X-Multi", "b"),
            1,
        )
        .await;

        let outcome = executor_for(&server)
            .process(
                &ExecutionContext::background(),
                BatchPayload::new(vec![OperationFactory::get("/multi", "m")]),
            )
            .await;

        let result = &outcome.payload.operations[0];
        assert_eq!(result_header(result, "x-multi"), Some("a,b"));
        assert_eq!(result.header_values("x-multi").count(), 1);
        assert!(result.headers.iter().any(|h| h.name == "X-Multi" && h.value == "a,b"));
        assert!(result.headers.iter().any(|h| h.name == "Content-Length"));
    }

    #[tokio::test]
    async fn test_bodiless_operation_sends_no_body() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(reply(200))
            .mount(&server)
            .await;

        let outcome = executor_for(&server)
            .process(
                &ExecutionContext::background(),
                BatchPayload::new(vec![OperationFactory::get("/empty", "e")]),
            )
            .await;

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].body.is_empty());
        assert!(outcome.is_complete());
    }

    #[tokio::test]
    async fn test_empty_response_body_is_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(204).insert_header("X-Deleted", "1"))
            .mount(&server)
            .await;

        let payload = BatchPayload::new(vec![
            Operation::new("DELETE", "/items/1").with_bulk_id("1"),
            Operation::new("DELETE", "/items/2").with_bulk_id("2"),
        ])
        .fail_on_errors(0);
        let outcome = executor_for(&server)
            .process(&ExecutionContext::background(), payload)
            .await;

        assert_eq!(outcome.payload.len(), 1);
        let result = &outcome.payload.operations[0];
        assert_eq!(result.status_code(), Some(204));
        assert_eq!(result_header(result, "x-deleted"), Some("1"));
        assert!(result.body.is_none());
        assert!(matches!(
            outcome.error.as_ref().and_then(BatchError::operation_error),
            Some(OperationError::BodyParse { status: 204, .. })
        ));
        assert_eq!(received_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_truncated_body_is_partial_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nX-A: b\r\n\r\n{")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let executor = BatchExecutor::new(format!("http://{}", addr), Arc::new(NoopLogger));
        let payload = BatchPayload::new(vec![OperationFactory::get("/short", "s")]).fail_on_errors(1);
        let outcome = executor
            .process(&ExecutionContext::background(), payload)
            .await;

        let result = &outcome.payload.operations[0];
        assert_eq!(result.status_code(), Some(200));
        assert_eq!(result_header(result, "x-a"), Some("b"));
        assert!(result.body.is_none());
        assert!(matches!(
            outcome.error.as_ref().and_then(BatchError::operation_error),
            Some(OperationError::PartialResponse { status: 200, .. })
        ));
    }

    #[tokio::test]
    async fn test_json_bodies_round_trip_through_backend() {
        let server = MockServer::start().await;
        stub(
            &server,
            "POST",
            "/docs",
            ResponseTemplate::new(201).set_body_json(sample_document()),
            1,
        )
        .await;

        let outcome = executor_for(&server)
            .process(
                &ExecutionContext::background(),
                BatchPayload::new(vec![OperationFactory::post(
                    "/docs",
                    "doc",
                    sample_document(),
                )]),
            )
            .await;

        let requests = server.received_requests().await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent, sample_document());

        let result = &outcome.payload.operations[0];
        assert_eq!(result.status_code(), Some(201));
        assert_eq!(result.body, Some(sample_document()));
        assert_eq!(result.bulk_id, "doc");
        assert!(result.method.is_empty());
        assert!(result.path.is_empty());
    }

    #[tokio::test]
    async fn test_base_path_is_prefixed() {
        let server = MockServer::start().await;
        stub(&server, "GET", "/api/v2/items", reply(200), 1).await;

        let executor = BatchExecutor::new(format!("{}/api/v2", server.uri()), Arc::new(NoopLogger));
        let outcome = executor
            .process(
                &ExecutionContext::background(),
                BatchPayload::new(vec![OperationFactory::get("/items", "i")]),
            )
            .await;

        assert_eq!(outcome.payload.operations[0].status_code(), Some(200));
    }

    // ==================== Tracing ====================

    #[tokio::test]
    async fn test_trace_hook_sees_every_call() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let hook: TraceHook = Arc::new(move |ctx: &ExecutionContext, headers: &mut HeaderMap| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = ctx.request_id() {
                headers.insert("x-trace-id", id.parse().unwrap());
            }
        });

        let ctx = ExecutionContext::background().with_request_id("trace-1");
        executor_for(&server)
            .with_trace(hook)
            .process(&ctx, payload_of(2))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let requests = server.received_requests().await.unwrap();
        for request in &requests {
            assert_eq!(
                request.headers.get("x-trace-id").unwrap().to_str().unwrap(),
                "trace-1"
            );
        }
    }

    #[tokio::test]
    async fn test_request_id_propagation_hook() {
        let server = MockServer::start().await;
        Mock::given(path("/items/0"))
            .and(wiremock::matchers::header("x-request-id", "req-77"))
            .respond_with(reply(200))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = ExecutionContext::background().with_request_id("req-77");
        let outcome = executor_for(&server)
            .with_trace(batch_gateway::request_id_propagation())
            .process(&ctx, payload_of(1).fail_on_errors(0))
            .await;

        assert!(outcome.is_complete());
    }
}
