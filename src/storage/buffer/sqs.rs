//! Amazon SQS buffer

use super::{Buffer, encode_message};
use crate::config::BufferConfig;
use crate::core::models::{BufferMessage, CanonicalLogRecord};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::Client;
use aws_sdk_sqs::error::{DisplayErrorContext, SdkError};
use aws_sdk_sqs::types::{MessageSystemAttributeName, QueueAttributeName};
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info};

/// Buffer backed by an SQS queue.
///
/// Visibility timeout, retention and the redrive policy (max receive count and
/// dead-letter queue) are properties of the queue itself.
#[derive(Debug, Clone)]
pub struct SqsBuffer {
    client: Client,
    queue_url: String,
    receive_wait_secs: i32,
}

impl SqsBuffer {
    pub async fn new(config: &BufferConfig) -> Result<Self> {
        let queue_url = config
            .queue_url
            .clone()
            .ok_or_else(|| PipelineError::config("sqs buffer requires a queue URL"))?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        info!(queue_url = %queue_url, "Using SQS buffer");
        Ok(Self {
            client: Client::new(&sdk_config),
            queue_url,
            receive_wait_secs: config.receive_wait_secs as i32,
        })
    }

    pub fn from_client(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
            receive_wait_secs: 0,
        }
    }
}

fn sqs_error<E, R>(action: &str, err: SdkError<E, R>) -> PipelineError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = format!("SQS {} failed: {}", action, DisplayErrorContext(&err));
    match err {
        SdkError::TimeoutError(_) => PipelineError::timeout(message),
        _ => PipelineError::buffer(message),
    }
}

fn parse_sent_at(value: Option<&String>) -> DateTime<Utc> {
    value
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        .unwrap_or_else(Utc::now)
}

#[async_trait]
impl Buffer for SqsBuffer {
    fn name(&self) -> &'static str {
        "sqs"
    }

    async fn send(&self, record: &CanonicalLogRecord) -> Result<String> {
        let body = encode_message(record)?;
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| sqs_error("send", e))?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        debug!(
            tenant_id = %record.tenant_id(),
            record_id = %record.record_id(),
            message_id = %message_id,
            "Buffered record"
        );
        Ok(message_id)
    }

    async fn receive(&self, max: usize) -> Result<Vec<BufferMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max.clamp(1, 10) as i32)
            .wait_time_seconds(self.receive_wait_secs)
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount)
            .message_system_attribute_names(MessageSystemAttributeName::SentTimestamp)
            .send()
            .await
            .map_err(|e| sqs_error("receive", e))?;

        let messages = output
            .messages()
            .iter()
            .filter_map(|message| {
                let attributes = message.attributes();
                let receive_count = attributes
                    .and_then(|a| a.get(&MessageSystemAttributeName::ApproximateReceiveCount))
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1);
                let sent_at = parse_sent_at(
                    attributes.and_then(|a| a.get(&MessageSystemAttributeName::SentTimestamp)),
                );

                Some(BufferMessage {
                    message_id: message.message_id()?.to_string(),
                    receipt_handle: message.receipt_handle()?.to_string(),
                    body: message.body().unwrap_or_default().to_string(),
                    receive_count,
                    sent_at,
                })
            })
            .collect();

        Ok(messages)
    }

    async fn ack(&self, message: &BufferMessage) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(&message.receipt_handle)
            .send()
            .await
            .map_err(|e| sqs_error("delete", e))?;
        Ok(())
    }

    async fn report_failure(&self, message: &BufferMessage) -> Result<()> {
        // Leaving the message undeleted is the failure report; the queue
        // redelivers it when its visibility timeout runs out
        debug!(message_id = %message.message_id, "Message left for redelivery");
        Ok(())
    }

    async fn approximate_depth(&self) -> Result<usize> {
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(&self.queue_url)
            .attribute_names(QueueAttributeName::ApproximateNumberOfMessages)
            .attribute_names(QueueAttributeName::ApproximateNumberOfMessagesNotVisible)
            .send()
            .await
            .map_err(|e| sqs_error("get attributes", e))?;

        let depth = output
            .attributes()
            .map(|attributes| {
                attributes
                    .values()
                    .filter_map(|v| v.parse::<usize>().ok())
                    .sum()
            })
            .unwrap_or(0);
        Ok(depth)
    }

    async fn health_check(&self) -> Result<()> {
        self.approximate_depth().await.map(|_| ())
    }
}
