//! AWS event stream parser and chunk stream adapter.
//!
//! `InvokeAgent` answers with the AWS event stream binary protocol. Each
//! frame has the layout:
//!
//! ```text
//! [total_len:4][headers_len:4][prelude_crc:4][headers...][payload...][msg_crc:4]
//! ```
//!
//! `chunk` events carry `{"bytes":"<base64>"}`; the decoded bytes are a
//! fragment of the agent's answer. Exception frames end the stream with an
//! error. Trace and other event types are skipped.

use base64::Engine;
use futures_util::{Stream, StreamExt};

use chatrelay_core::agent::ChunkStream;
use chatrelay_types::agent::{AgentChunkPayload, AgentExceptionPayload};
use chatrelay_types::error::RelayError;

const PRELUDE_LEN: usize = 12;
const MESSAGE_CRC_LEN: usize = 4;

/// One decoded frame. Only string-typed headers are kept.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Frame {
    pub message_type: Option<String>,
    pub event_type: Option<String>,
    pub exception_type: Option<String>,
    pub error_message: Option<String>,
    pub payload: Vec<u8>,
}

/// Parse binary headers from an event stream frame.
///
/// Header format: `[name_len:1][name:N][type:1][value...]`. Value sizes are
/// fixed per type except byte arrays (6) and strings (7), which carry a
/// two-byte length.
fn parse_headers(mut buf: &[u8], frame: &mut Frame) -> Result<(), RelayError> {
    while !buf.is_empty() {
        let name_len = buf[0] as usize;
        let name = buf
            .get(1..1 + name_len)
            .ok_or_else(|| malformed("header name overruns header block"))?;
        let name = String::from_utf8_lossy(name).to_string();
        buf = &buf[1 + name_len..];

        let (&header_type, rest) = buf
            .split_first()
            .ok_or_else(|| malformed("header type missing"))?;
        buf = rest;

        let value_len = match header_type {
            0 | 1 => 0,
            2 => 1,
            3 => 2,
            4 => 4,
            5 | 8 => 8,
            9 => 16,
            6 | 7 => {
                let len = buf
                    .get(..2)
                    .ok_or_else(|| malformed("header value length missing"))?;
                buf = &buf[2..];
                u16::from_be_bytes([len[0], len[1]]) as usize
            }
            other => return Err(malformed(&format!("unknown header type {other}"))),
        };
        let value = buf
            .get(..value_len)
            .ok_or_else(|| malformed("header value overruns header block"))?;
        buf = &buf[value_len..];

        if header_type == 7 {
            let value = String::from_utf8_lossy(value).to_string();
            match name.as_str() {
                ":message-type" => frame.message_type = Some(value),
                ":event-type" => frame.event_type = Some(value),
                ":exception-type" => frame.exception_type = Some(value),
                ":error-message" => frame.error_message = Some(value),
                _ => {}
            }
        }
    }
    Ok(())
}

/// Parse one frame from the front of `buf`.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet,
/// otherwise the frame and the number of bytes it occupied.
pub(crate) fn parse_event_stream_frame(buf: &[u8]) -> Result<Option<(Frame, usize)>, RelayError> {
    if buf.len() < PRELUDE_LEN {
        return Ok(None);
    }

    let total_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    let headers_len = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
    // bytes 8..12 = prelude CRC (skip)

    if total_len < PRELUDE_LEN + MESSAGE_CRC_LEN {
        return Err(malformed(&format!("frame length {total_len} shorter than its envelope")));
    }
    let headers_end = PRELUDE_LEN + headers_len;
    let payload_end = total_len - MESSAGE_CRC_LEN;
    if headers_end > payload_end {
        return Err(malformed("headers overrun frame"));
    }

    if buf.len() < total_len {
        return Ok(None);
    }

    let mut frame = Frame::default();
    parse_headers(&buf[PRELUDE_LEN..headers_end], &mut frame)?;
    frame.payload = buf[headers_end..payload_end].to_vec();

    Ok(Some((frame, total_len)))
}

/// Turn one frame into answer bytes, nothing, or an error.
fn frame_to_chunk(frame: Frame) -> Result<Option<Vec<u8>>, RelayError> {
    match frame.message_type.as_deref() {
        Some("exception") => {
            let payload: AgentExceptionPayload =
                serde_json::from_slice(&frame.payload).unwrap_or_default();
            let message = payload
                .message
                .or(frame.exception_type)
                .unwrap_or_else(|| "Agent invocation failed".to_string());
            return Err(RelayError::Agent(message));
        }
        Some("error") => {
            return Err(RelayError::Agent(
                frame
                    .error_message
                    .unwrap_or_else(|| "Agent invocation failed".to_string()),
            ));
        }
        _ => {}
    }

    match frame.event_type.as_deref() {
        Some("chunk") => {
            let chunk: AgentChunkPayload = serde_json::from_slice(&frame.payload)
                .map_err(|e| RelayError::Agent(format!("bedrock chunk wrapper: {e}")))?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(&chunk.bytes)
                .map_err(|e| RelayError::Agent(format!("base64 decode: {e}")))?;
            Ok(Some(bytes))
        }
        Some(other) => {
            tracing::debug!(event_type = %other, "non-chunk agent frame, skipping");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Adapt a raw response body into a stream of answer chunks.
pub(crate) fn agent_chunk_stream<S, B, E>(body: S) -> ChunkStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::try_stream! {
        let mut body = Box::pin(body);
        let mut buffer = Vec::new();

        while let Some(read) = body.next().await {
            let bytes = read.map_err(|e| RelayError::Agent(format!("response body read: {e}")))?;
            buffer.extend_from_slice(bytes.as_ref());

            // Parse as many complete frames as possible from the buffer
            while let Some((frame, consumed)) = parse_event_stream_frame(&buffer)? {
                buffer.drain(..consumed);
                if let Some(chunk) = frame_to_chunk(frame)? {
                    yield chunk;
                }
            }
        }

        if !buffer.is_empty() {
            Err::<(), _>(malformed(&format!(
                "stream ended inside a frame ({} bytes left)",
                buffer.len()
            )))?;
        }
    })
}

fn malformed(detail: &str) -> RelayError {
    RelayError::Agent(format!("malformed event stream: {detail}"))
}

/// Encode a frame with string headers. CRCs are left zeroed.
#[cfg(test)]
pub(crate) fn encode_frame(headers: &[(&str, &str)], payload: &[u8]) -> Vec<u8> {
    let mut header_block = Vec::new();
    for (name, value) in headers {
        header_block.push(name.len() as u8);
        header_block.extend_from_slice(name.as_bytes());
        header_block.push(7);
        header_block.extend_from_slice(&(value.len() as u16).to_be_bytes());
        header_block.extend_from_slice(value.as_bytes());
    }

    let total_len = PRELUDE_LEN + header_block.len() + payload.len() + MESSAGE_CRC_LEN;
    let mut frame = Vec::with_capacity(total_len);
    frame.extend_from_slice(&(total_len as u32).to_be_bytes());
    frame.extend_from_slice(&(header_block.len() as u32).to_be_bytes());
    frame.extend_from_slice(&[0u8; 4]);
    frame.extend_from_slice(&header_block);
    frame.extend_from_slice(payload);
    frame.extend_from_slice(&[0u8; 4]);
    frame
}

#[cfg(test)]
pub(crate) fn chunk_frame(text: &str) -> Vec<u8> {
    let payload = serde_json::json!({
        "bytes": base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
    });
    encode_frame(
        &[(":event-type", "chunk"), (":content-type", "application/json"), (":message-type", "event")],
        payload.to_string().as_bytes(),
    )
}
