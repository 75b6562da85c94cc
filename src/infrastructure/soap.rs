use crate::config::GatewayConfig;
use crate::domain::gateway::{ProcessRequest, RegisterRequest, Registration};
use crate::domain::ports::PaymentGateway;
use crate::error::{Fault, GatewayError, PaymentError, Result};
use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use tracing::debug;

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SERVICE_NS: &str = "http://BBS.EPayment.ServiceConnector";
pub const DATA_CONTRACT_NS: &str =
    "http://schemas.datacontract.org/2004/07/BBS.EPayment.ServiceConnector";

const WEB_SERVICE_PLATFORM: &str = "RUST";

/// `PaymentGateway` backed by the Netaxept SOAP service.
///
/// Only the `Register` and `Process` operations are spoken. Each call is a
/// single HTTP request bounded by the configured timeout; nothing is retried.
pub struct NetaxeptClient {
    config: GatewayConfig,
    http: reqwest::Client,
}

impl NetaxeptClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::ConfigError(format!("HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    async fn call(&self, action: &str, request_body: &str) -> Result<SoapDocument, GatewayError> {
        let envelope = envelope(
            action,
            &self.config.merchant_id,
            &self.config.token,
            request_body,
        );
        debug!(action, endpoint = %self.config.endpoint, "netaxept-soap-request");

        let response = self
            .http
            .post(self.config.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{SERVICE_NS}/Netaxept/{action}\""))
            .body(envelope)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        debug!(action, %status, "netaxept-soap-response");

        // Faults arrive with HTTP 500, so the body is inspected before the status.
        let document = SoapDocument::parse(&body)?;
        if let Some(fault) = document.fault() {
            return Err(GatewayError::Fault(fault));
        }
        if !status.is_success() {
            return Err(GatewayError::Transport(format!(
                "unexpected HTTP status {status}"
            )));
        }
        Ok(document)
    }
}

#[async_trait]
impl PaymentGateway for NetaxeptClient {
    async fn register(&self, request: &RegisterRequest) -> Result<Registration, GatewayError> {
        let document = self.call("Register", &register_body(request)).await?;
        let transaction_id = document
            .find(&["RegisterResult", "TransactionId"])
            .or_else(|| document.find(&["TransactionId"]))
            .ok_or_else(|| {
                GatewayError::Transport("Register response has no TransactionId".to_string())
            })?;
        Ok(Registration {
            transaction_id: transaction_id.to_string(),
        })
    }

    async fn process(&self, request: &ProcessRequest) -> Result<(), GatewayError> {
        self.call("Process", &process_body(request)).await?;
        Ok(())
    }

    fn terminal_url(&self, transaction_id: &str) -> String {
        terminal_url(&self.config, transaction_id)
    }
}

/// Hosted terminal page for `transaction_id`; no request is made.
pub fn terminal_url(config: &GatewayConfig, transaction_id: &str) -> String {
    let mut url = config.terminal.clone();
    url.query_pairs_mut()
        .append_pair("merchantId", &config.merchant_id)
        .append_pair("transactionId", transaction_id);
    url.to_string()
}

fn envelope(action: &str, merchant_id: &str, token: &str, request_body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<s:Envelope xmlns:s="{env}" xmlns:n="{svc}" xmlns:d="{data}">"#,
            "<s:Body><n:{action}>",
            "<n:merchantId>{merchant}</n:merchantId>",
            "<n:token>{token}</n:token>",
            "<n:request>{body}</n:request>",
            "</n:{action}></s:Body></s:Envelope>"
        ),
        env = SOAP_ENVELOPE_NS,
        svc = SERVICE_NS,
        data = DATA_CONTRACT_NS,
        action = action,
        merchant = escape(merchant_id),
        token = escape(token),
        body = request_body,
    )
}

fn element(name: &str, value: &str) -> String {
    format!("<d:{name}>{}</d:{name}>", escape(value))
}

// Data contract members must appear in alphabetical order.
fn register_body(request: &RegisterRequest) -> String {
    let mut body = String::new();
    if let Some(description) = &request.description {
        body.push_str(&element("Description", description));
    }
    body.push_str("<d:Environment>");
    body.push_str(&element("WebServicePlatform", WEB_SERVICE_PLATFORM));
    body.push_str("</d:Environment>");
    body.push_str("<d:Order>");
    body.push_str(&element("Amount", &request.amount.to_string()));
    body.push_str(&element("CurrencyCode", &request.currency_code));
    body.push_str(&element("OrderNumber", &request.order_number));
    body.push_str("</d:Order>");
    body.push_str("<d:Terminal>");
    body.push_str(&element("AutoAuth", if request.auto_auth { "true" } else { "false" }));
    body.push_str(&element("RedirectUrl", &request.redirect_url));
    body.push_str("</d:Terminal>");
    body
}

fn process_body(request: &ProcessRequest) -> String {
    let mut body = element("Operation", request.operation.as_str());
    if let Some(amount) = request.amount {
        body.push_str(&element("TransactionAmount", &amount.to_string()));
    }
    body.push_str(&element("TransactionId", &request.transaction_id));
    body
}

/// Text content of a SOAP response, keyed by element path (local names).
#[derive(Debug, Default)]
struct SoapDocument {
    elements: Vec<(Vec<String>, String)>,
    has_fault: bool,
}

impl SoapDocument {
    fn parse(xml: &str) -> Result<Self, GatewayError> {
        let malformed = |e: quick_xml::Error| {
            GatewayError::Transport(format!("malformed SOAP response: {e}"))
        };

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut document = SoapDocument::default();
        let mut path: Vec<String> = Vec::new();
        let mut has_envelope = false;
        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    match name.as_str() {
                        "Envelope" => has_envelope = true,
                        "Fault" => document.has_fault = true,
                        _ => {}
                    }
                    path.push(name);
                }
                Event::End(_) => {
                    path.pop();
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| malformed(e.into()))?;
                    document.elements.push((path.clone(), text.into_owned()));
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    document.elements.push((path.clone(), text));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !has_envelope {
            return Err(GatewayError::Transport(
                "response is not a SOAP envelope".to_string(),
            ));
        }
        Ok(document)
    }

    /// First text whose element path ends with `suffix`.
    fn find(&self, suffix: &[&str]) -> Option<&str> {
        self.find_within(None, suffix)
    }

    fn find_within(&self, ancestor: Option<&str>, suffix: &[&str]) -> Option<&str> {
        self.elements
            .iter()
            .find(|(path, _)| {
                path.len() >= suffix.len()
                    && path[path.len() - suffix.len()..]
                        .iter()
                        .zip(suffix)
                        .all(|(a, b)| a == b)
                    && ancestor.is_none_or(|name| path.iter().any(|p| p == name))
            })
            .map(|(_, text)| text.as_str())
    }

    fn fault(&self) -> Option<Fault> {
        if !self.has_fault {
            return None;
        }

        let in_bbs = Some("BBSException");
        if self.elements.iter().any(|(path, _)| path.iter().any(|p| p == "BBSException")) {
            let field = |suffix: &[&str]| {
                self.find_within(in_bbs, suffix)
                    .unwrap_or_default()
                    .to_string()
            };
            return Some(Fault::Structured {
                code: field(&["Result", "ResponseCode"]),
                source: field(&["Result", "ResponseSource"]),
                text: field(&["Result", "ResponseText"]),
                message: field(&["Message"]),
            });
        }

        let message = self
            .find_within(Some("detail"), &["Message"])
            .or_else(|| self.find(&["faultstring"]))
            .unwrap_or("unknown gateway fault");
        Some(Fault::Opaque {
            message: message.to_string(),
        })
    }
}
