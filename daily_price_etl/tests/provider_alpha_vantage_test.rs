use daily_price_etl::models::symbol::Symbol;
use daily_price_etl::providers::alpha_vantage::{AlphaVantageProvider, OutputSize};
use daily_price_etl::providers::{ProviderError, SeriesProvider, SignalKind, TransportError};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key-123";

async fn provider_for(server: &MockServer) -> AlphaVantageProvider {
    AlphaVantageProvider::new(
        format!("{}/query", server.uri()),
        SecretString::new(API_KEY.into()),
        OutputSize::Compact,
    )
    .unwrap()
}

async fn respond_with(body: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(body)
        .mount(&server)
        .await;
    server
}

fn ibm() -> Symbol {
    Symbol::parse("IBM").unwrap()
}

#[tokio::test]
async fn sends_the_daily_query_and_keeps_date_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "TIME_SERIES_DAILY"))
        .and(query_param("symbol", "IBM"))
        .and(query_param("apikey", API_KEY))
        .and(query_param("outputsize", "compact"))
        // Raw text so the newest-first key order reaches the client untouched.
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "Meta Data": {"1. Information": "Daily Prices", "2. Symbol": "IBM"},
                "Time Series (Daily)": {
                    "2024-01-03": {"1. open": "161.0", "2. high": "162.5", "3. low": "160.1",
                                   "4. close": "162.0", "5. volume": "4000000"},
                    "2024-01-02": {"1. open": "160.0", "2. high": "161.5", "3. low": "159.2",
                                   "4. close": "161.1", "5. volume": "3500000"}
                }
            }"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let series = provider_for(&server).await.fetch_daily(&ibm()).await.unwrap();

    let dates: Vec<&str> = series.keys().map(String::as_str).collect();
    assert_eq!(dates, ["2024-01-03", "2024-01-02"]);
    assert_eq!(series["2024-01-02"].close.as_deref(), Some("161.1"));
    assert_eq!(series["2024-01-03"].volume.as_deref(), Some("4000000"));
}

#[tokio::test]
async fn numeric_fields_are_accepted_as_well_as_strings() {
    let server = respond_with(ResponseTemplate::new(200).set_body_string(
        r#"{"Time Series (Daily)": {"2024-01-02": {"1. open": 10.0, "2. high": "11.0",
            "3. low": 9.5, "4. close": "10.5", "5. volume": 1000}}}"#,
    ))
    .await;

    let series = provider_for(&server).await.fetch_daily(&ibm()).await.unwrap();

    let bar = &series["2024-01-02"];
    assert_eq!(bar.open.as_deref(), Some("10.0"));
    assert_eq!(bar.low.as_deref(), Some("9.5"));
    assert_eq!(bar.volume.as_deref(), Some("1000"));
}

#[tokio::test]
async fn maps_each_signal_field_to_its_kind() {
    let cases = [
        (json!({"Error Message": "Invalid API call."}), SignalKind::Error, "Invalid API call."),
        (json!({"Information": "premium endpoint"}), SignalKind::Information, "premium endpoint"),
        (json!({"Note": "5 calls per minute"}), SignalKind::Throttle, "5 calls per minute"),
        (
            json!({"Error Message": "bad", "Note": "slow down"}),
            SignalKind::Error,
            "bad",
        ),
    ];

    for (body, kind, message) in cases {
        let server = respond_with(ResponseTemplate::new(200).set_body_json(body)).await;
        let err = provider_for(&server).await.fetch_daily(&ibm()).await.unwrap_err();

        match err {
            ProviderError::Upstream(signal) => {
                assert_eq!(signal.kind, kind);
                assert_eq!(signal.message, message);
                assert_eq!(signal.symbol, "IBM");
            }
            other => panic!("expected an upstream signal, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn missing_series_carries_a_bounded_snippet() {
    let filler = "x".repeat(1000);
    let body = json!({"Meta Data": {"padding": filler}}).to_string();
    let server = respond_with(ResponseTemplate::new(200).set_body_string(body.clone())).await;

    let err = provider_for(&server).await.fetch_daily(&ibm()).await.unwrap_err();

    assert_eq!(err.signal_kind(), Some(SignalKind::MissingData));
    let ProviderError::Upstream(signal) = err else {
        panic!("expected an upstream signal");
    };
    let (_, snippet) = signal.message.split_once("snippet: ").unwrap();
    assert_eq!(snippet.chars().count(), 300);
    assert!(body.starts_with(snippet));
}

#[tokio::test]
async fn empty_series_is_missing_data() {
    let server = respond_with(
        ResponseTemplate::new(200).set_body_json(json!({"Time Series (Daily)": {}})),
    )
    .await;

    let err = provider_for(&server).await.fetch_daily(&ibm()).await.unwrap_err();
    assert_eq!(err.signal_kind(), Some(SignalKind::MissingData));
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let server = respond_with(ResponseTemplate::new(503).set_body_string("unavailable")).await;

    let err = provider_for(&server).await.fetch_daily(&ibm()).await.unwrap_err();

    match err {
        ProviderError::Transport(TransportError::Status { symbol, status }) => {
            assert_eq!(symbol, "IBM");
            assert_eq!(status.as_u16(), 503);
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let server =
        respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let err = provider_for(&server).await.fetch_daily(&ibm()).await.unwrap_err();

    assert!(matches!(
        err,
        ProviderError::Transport(TransportError::Decode { .. })
    ));
    assert_eq!(err.signal_kind(), None);
}

#[tokio::test]
async fn connection_errors_do_not_leak_the_api_key() {
    // Nothing listens on a port whose listener was just dropped.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/query", listener.local_addr().unwrap());
    drop(listener);

    let provider =
        AlphaVantageProvider::new(base, SecretString::new(API_KEY.into()), OutputSize::Compact)
            .unwrap();
    let err = provider.fetch_daily(&ibm()).await.unwrap_err();

    assert!(matches!(
        err,
        ProviderError::Transport(TransportError::Request { .. })
    ));
    let rendered = format!("{err} {err:?}");
    assert!(!rendered.contains(API_KEY), "api key leaked: {rendered}");
}
