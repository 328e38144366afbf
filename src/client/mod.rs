//! Client layer: owns the message queue, orchestrates transport calls and maps
//! transport ↔ domain.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use log::{debug, info, warn};

use crate::domain::{
    AdminUser, AuthKey, EncodedText, EucKr, GatewayResponse, MAX_MESSAGE_BYTES, PhoneNumber,
    QueuedEntry, QueuedMessage, ReservationId, Schedule, SendOptions, SenderIp, SenderPhone,
    SliceStrategy, TextCodec, ValidationError, cancel_date, encode_text, slice_message,
};
use crate::transport::{DecodeError, FormParams};

const DEFAULT_ENDPOINT: &str = "https://sms.phps.kr/lib/send.sms";
const DEFAULT_IP_CHECK_ENDPOINT: &str = "https://api.ipify.org";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: FormParams,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;

    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: FormParams,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(
                    reqwest::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(crate::transport::encode_form_body(&params))
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();
            Ok(HttpResponse { status, body })
        })
    }

    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self.client.get(url).send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// Gateway account credentials, sent with every call.
pub struct Credentials {
    admin_user: AdminUser,
    auth_key: AuthKey,
}

impl Credentials {
    /// Validate that both the account id and the key are non-empty.
    pub fn new(
        admin_user: impl Into<String>,
        auth_key: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            admin_user: AdminUser::new(admin_user)?,
            auth_key: AuthKey::new(auth_key)?,
        })
    }

    pub fn admin_user(&self) -> &AdminUser {
        &self.admin_user
    }

    fn push_form_params(&self, params: &mut FormParams) {
        params.push((AdminUser::FIELD, self.admin_user.as_str().as_bytes().to_vec()));
        params.push((AuthKey::FIELD, self.auth_key.as_str().as_bytes().to_vec()));
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`PhpsClient`].
///
/// The gateway reports application-level failures inside the response body;
/// those are not errors here and must be checked on the returned
/// [`GatewayResponse`].
pub enum PhpsSmsError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// Response body is not a PHP-serialized mapping.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Input or precondition rejected before anything was sent.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone)]
/// Builder for [`PhpsClient`].
///
/// Use this when you need to customize endpoints, timeout, user-agent, text
/// codec or slicing, or to skip IP discovery by providing the sender IP.
pub struct PhpsClientBuilder {
    credentials: Credentials,
    sender_phone: SenderPhone,
    sender_ip: Option<SenderIp>,
    endpoint: String,
    ip_check_endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    codec: Arc<dyn TextCodec>,
    slice_strategy: SliceStrategy,
}

impl PhpsClientBuilder {
    /// Create a builder with default endpoints, EUC-KR and compatible slicing.
    pub fn new(credentials: Credentials, sender_phone: SenderPhone) -> Self {
        Self {
            credentials,
            sender_phone,
            sender_ip: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            ip_check_endpoint: DEFAULT_IP_CHECK_ENDPOINT.to_owned(),
            timeout: None,
            user_agent: None,
            codec: Arc::new(EucKr),
            slice_strategy: SliceStrategy::default(),
        }
    }

    /// Override the gateway endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the URL queried for the public IP. Its response body must be
    /// the bare address.
    pub fn ip_check_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.ip_check_endpoint = endpoint.into();
        self
    }

    /// Use this sender IP instead of discovering it.
    pub fn sender_ip(mut self, sender_ip: SenderIp) -> Self {
        self.sender_ip = Some(sender_ip);
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Encoding for message bodies and comments.
    pub fn codec(mut self, codec: impl TextCodec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn slice_strategy(mut self, strategy: SliceStrategy) -> Self {
        self.slice_strategy = strategy;
        self
    }

    /// Build a [`PhpsClient`], querying the IP check endpoint once if no
    /// sender IP was set.
    pub async fn build(self) -> Result<PhpsClient, PhpsSmsError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| PhpsSmsError::Transport(Box::new(err)))?;

        self.finish(Arc::new(ReqwestTransport { client })).await
    }

    async fn finish(self, http: Arc<dyn HttpTransport>) -> Result<PhpsClient, PhpsSmsError> {
        let sender_ip = match self.sender_ip {
            Some(sender_ip) => sender_ip,
            None => discover_ip(http.as_ref(), &self.ip_check_endpoint).await?,
        };

        Ok(PhpsClient {
            credentials: self.credentials,
            sender_phone: self.sender_phone,
            sender_ip,
            endpoint: self.endpoint,
            codec: self.codec,
            slice_strategy: self.slice_strategy,
            queue: Vec::new(),
            http,
        })
    }
}

/// High-level PHP School SMS client.
///
/// Messages are queued with [`PhpsClient::add`] and delivered by
/// [`PhpsClient::send`], one gateway request per queued entry. Text fields
/// are sent in EUC-KR unless another codec is configured.
pub struct PhpsClient {
    credentials: Credentials,
    sender_phone: SenderPhone,
    sender_ip: SenderIp,
    endpoint: String,
    codec: Arc<dyn TextCodec>,
    slice_strategy: SliceStrategy,
    queue: Vec<QueuedEntry>,
    http: Arc<dyn HttpTransport>,
}

impl PhpsClient {
    /// Create a client with a known sender IP and default settings. No request
    /// is made.
    pub fn new(credentials: Credentials, sender_phone: SenderPhone, sender_ip: SenderIp) -> Self {
        Self {
            credentials,
            sender_phone,
            sender_ip,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            codec: Arc::new(EucKr),
            slice_strategy: SliceStrategy::default(),
            queue: Vec::new(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Create a client with default settings, discovering the sender IP.
    pub async fn connect(
        credentials: Credentials,
        sender_phone: SenderPhone,
    ) -> Result<Self, PhpsSmsError> {
        Self::builder(credentials, sender_phone).build().await
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials, sender_phone: SenderPhone) -> PhpsClientBuilder {
        PhpsClientBuilder::new(credentials, sender_phone)
    }

    pub fn sender_ip(&self) -> &SenderIp {
        &self.sender_ip
    }

    /// Queue `text` for `recipient`.
    ///
    /// The recipient is normalized and the trimmed text encoded. Bodies over
    /// [`MAX_MESSAGE_BYTES`] are rejected unless `allow_slice` is set, in which
    /// case the text as given, surrounding whitespace included, is split and
    /// every segment is queued for the same recipient. Returns how many
    /// entries were queued.
    pub fn add(
        &mut self,
        recipient: &str,
        text: &str,
        allow_slice: bool,
    ) -> Result<usize, ValidationError> {
        let recipient = PhoneNumber::parse(recipient)?;
        let body = encode_text(self.codec.as_ref(), QueuedEntry::BODY_FIELD, text.trim())?;

        if body.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        if body.len() <= MAX_MESSAGE_BYTES {
            self.queue.push(QueuedEntry::new(recipient, body));
            return Ok(1);
        }

        if !allow_slice {
            return Err(ValidationError::MessageTooLong {
                len: body.len(),
                max: MAX_MESSAGE_BYTES,
            });
        }

        let segments = slice_message(text, self.codec.as_ref(), self.slice_strategy)?;
        let count = segments.len();
        debug!(
            "sliced {} byte message for {recipient} into {count} segments",
            body.len()
        );
        self.queue.extend(
            segments
                .into_iter()
                .map(|segment| QueuedEntry::new(recipient.clone(), segment)),
        );
        Ok(count)
    }

    /// Queued messages with their bodies decoded back to text.
    pub fn queued(&self) -> Vec<QueuedMessage> {
        self.queue
            .iter()
            .map(|entry| QueuedMessage {
                recipient: entry.recipient().clone(),
                text: self.codec.decode(entry.body().as_bytes()),
            })
            .collect()
    }

    /// Queued entries as they will be sent.
    pub fn entries(&self) -> &[QueuedEntry] {
        &self.queue
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Ask the gateway for the account's pending reservations.
    pub async fn view_pending(&self) -> Result<GatewayResponse, PhpsSmsError> {
        let mut params = FormParams::new();
        self.credentials.push_form_params(&mut params);
        params.extend(crate::transport::encode_view_form());

        debug!("requesting pending reservations");
        self.post(params).await
    }

    /// Cancel a scheduled send.
    ///
    /// The request is always dated one day ahead of the current time.
    pub async fn cancel(
        &self,
        reservation: ReservationId,
    ) -> Result<GatewayResponse, PhpsSmsError> {
        let mut params = FormParams::new();
        self.credentials.push_form_params(&mut params);
        params.extend(crate::transport::encode_cancel_form(
            reservation,
            &cancel_date(Local::now()),
        ));

        debug!("cancelling reservation {}", reservation.value());
        self.post(params).await
    }

    /// Send every queued entry, one request each, in queue order.
    ///
    /// Errors:
    /// - [`ValidationError::EmptyQueue`] if nothing is queued,
    /// - [`ValidationError::SchedulingTooSoon`] if `scheduled_at` is less than
    ///   three minutes away,
    /// - [`ValidationError::Unencodable`] for a comment the codec can't encode.
    ///
    /// These leave the queue untouched. Past validation the queue is emptied
    /// even if a request fails partway; responses are returned uninterpreted.
    pub async fn send(
        &mut self,
        options: SendOptions,
    ) -> Result<Vec<GatewayResponse>, PhpsSmsError> {
        if self.queue.is_empty() {
            return Err(ValidationError::EmptyQueue.into());
        }

        let schedule = Schedule::resolve(options.scheduled_at, Local::now())?;
        let comment = match options.comment.as_ref() {
            Some(comment) => comment.encode(self.codec.as_ref())?,
            None => EncodedText::from_bytes(Vec::new()),
        };

        let entries = std::mem::take(&mut self.queue);
        let total = entries.len();
        let mut responses = Vec::with_capacity(total);

        for (index, entry) in entries.iter().enumerate() {
            let mut params = FormParams::new();
            self.credentials.push_form_params(&mut params);
            params.extend(crate::transport::encode_send_form(
                &self.sender_phone,
                &self.sender_ip,
                entry,
                &schedule,
                &comment,
            ));

            debug!(
                "sending message {}/{total} to {} (date={})",
                index + 1,
                entry.recipient(),
                schedule.as_str()
            );
            responses.push(self.post(params).await?);
        }

        info!("sent {total} queued messages");
        Ok(responses)
    }

    async fn post(&self, params: FormParams) -> Result<GatewayResponse, PhpsSmsError> {
        let response = self
            .http
            .post_form(&self.endpoint, params)
            .await
            .map_err(PhpsSmsError::Transport)?;

        let body = success_body(response)?;
        crate::transport::decode_response(&body).map_err(|err| {
            warn!("gateway returned an undecodable response: {err}");
            PhpsSmsError::Decode(err)
        })
    }
}

async fn discover_ip(http: &dyn HttpTransport, url: &str) -> Result<SenderIp, PhpsSmsError> {
    let response = http.get(url).await.map_err(PhpsSmsError::Transport)?;
    let body = success_body(response)?;
    let sender_ip = SenderIp::new(String::from_utf8_lossy(&body).into_owned())?;

    info!("using discovered sender IP {}", sender_ip.as_str());
    Ok(sender_ip)
}

fn success_body(response: HttpResponse) -> Result<Vec<u8>, PhpsSmsError> {
    if !(200..=299).contains(&response.status) {
        let body = String::from_utf8_lossy(&response.body);
        let body = if body.trim().is_empty() {
            None
        } else {
            Some(body.into_owned())
        };
        return Err(PhpsSmsError::HttpStatus {
            status: response.status,
            body,
        });
    }
    Ok(response.body)
}
