//! Verify request shaping and response mapping against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector names an entity, an action with its arguments, the request the
//! action must send, a simulated server response, and the expected outcome.
//! Bodies are compared as parsed JSON so field order does not matter.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use fineract::{
    ApiError, Client, FineractConfig, HttpMethod, HttpRequest, HttpResponse, Loan, RequestHandler,
    Resource, Result, Transport,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

/// Replays one canned response and records every request it is handed.
#[derive(Clone, Default)]
struct Replay {
    response: Arc<Mutex<Option<HttpResponse>>>,
    sent: Arc<Mutex<Vec<HttpRequest>>>,
}

impl Transport for Replay {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.sent.lock().unwrap().push(request.clone());
        self.response
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ApiError::Transport("no response queued".to_string()))
    }
}

fn handler_replaying(simulated: &Value) -> (Arc<RequestHandler>, Replay) {
    let replay = Replay::default();
    *replay.response.lock().unwrap() = Some(HttpResponse {
        status: simulated["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: simulated["body"].as_str().unwrap().to_string(),
    });
    let handler = RequestHandler::new(FineractConfig::new(BASE_URL), replay.clone());
    (Arc::new(handler), replay)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn arg_date(args: &Value) -> Option<NaiveDate> {
    args.get("date")
        .and_then(Value::as_str)
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap())
}

fn arg_i64(args: &Value, key: &str) -> i64 {
    args[key].as_i64().unwrap()
}

fn assert_request(name: &str, sent: &Replay, expected: &Value) {
    let sent = sent.sent.lock().unwrap();
    assert_eq!(sent.len(), 1, "{name}: request count");
    let req = &sent[0];

    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
    assert_eq!(req.header("Fineract-Platform-TenantId"), Some("default"), "{name}: tenant");
    assert_eq!(
        req.header("Authorization"),
        Some("Basic bWlmb3M6cGFzc3dvcmQ="),
        "{name}: authorization"
    );

    match expected.get("body") {
        Some(body) => {
            let sent_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn assert_outcome(name: &str, result: Result<bool>, case: &Value) {
    if let Some(expected_error) = case.get("expected_error") {
        let err = result.unwrap_err();
        match expected_error.as_str().unwrap() {
            "NotFound" => assert!(matches!(err, ApiError::NotFound), "{name}: expected NotFound"),
            "Forbidden" => assert!(
                matches!(err, ApiError::HttpError { status: 403, .. }),
                "{name}: expected 403"
            ),
            other => panic!("{name}: unknown expected_error: {other}"),
        }
    } else {
        let expected = case["expected_result"].as_bool().unwrap();
        assert_eq!(result.unwrap(), expected, "{name}: result");
    }
}

// ---------------------------------------------------------------------------
// Client commands
// ---------------------------------------------------------------------------

#[test]
fn client_command_vectors() {
    let raw = include_str!("../../test-vectors/client_commands.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let (handler, replay) = handler_replaying(&case["simulated_response"]);
        let client = Client::from_response(&handler, &case["entity"]);
        let args = &case["args"];
        let date = arg_date(args);

        let result = match case["action"].as_str().unwrap() {
            "activate" => client.activate(date),
            "close" => client.close(arg_i64(args, "reason_id"), date),
            "reject" => client.reject(arg_i64(args, "reason_id"), date),
            "withdraw" => client.withdraw(arg_i64(args, "reason_id"), date),
            "reactivate" => client.reactivate(date),
            "undo_reject" => client.undo_reject(date),
            "undo_withdrawal" => client.undo_withdrawal(date),
            other => panic!("{name}: unknown action: {other}"),
        };

        assert_request(name, &replay, &case["expected_request"]);
        assert_outcome(name, result, case);
    }
}

// ---------------------------------------------------------------------------
// Loan commands
// ---------------------------------------------------------------------------

#[test]
fn loan_command_vectors() {
    let raw = include_str!("../../test-vectors/loan_commands.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let (handler, replay) = handler_replaying(&case["simulated_response"]);
        let loan = Loan::from_response(&handler, &case["entity"]);
        let args = &case["args"];
        let date = arg_date(args);

        let result = match case["action"].as_str().unwrap() {
            "approve" => loan.approve(date),
            "undo_approval" => loan.undo_approval(),
            "reject" => loan.reject(date),
            "withdraw" => loan.withdraw(date),
            "disburse" => loan.disburse(args.get("amount").and_then(Value::as_f64), date),
            "undo_disbursal" => loan.undo_disbursal(),
            "make_repayment" => loan.make_repayment(args["amount"].as_f64().unwrap(), date),
            other => panic!("{name}: unknown action: {other}"),
        };

        assert_request(name, &replay, &case["expected_request"]);
        assert_outcome(name, result, case);
    }
}

// ---------------------------------------------------------------------------
// Client search
// ---------------------------------------------------------------------------

#[test]
fn client_search_vectors() {
    let raw = include_str!("../../test-vectors/client_search.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let (handler, replay) = handler_replaying(&case["simulated_response"]);

        let found =
            Client::get_client_by_phone_no(&handler, case["phone_no"].as_str().unwrap()).unwrap();

        assert_request(name, &replay, &case["expected_request"]);
        assert_eq!(
            found.and_then(|c| c.id),
            case["expected_id"].as_i64(),
            "{name}: found client"
        );
    }
}
