//! Custom protocol handlers for efficient data transfer
//!
//! This module implements the `frame://` custom protocol for direct binary
//! transfer of render frames, bypassing Tauri's IPC JSON serialization.

use bevy::log::{debug, warn};
use image::{codecs::jpeg::JpegEncoder, ImageEncoder};
use serde::Serialize;
use tauri::http::{
    header::{HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, CONTENT_TYPE},
    Response as HttpResponse, StatusCode,
};

use crate::config::{compression::JPEG_QUALITY, RENDER_HEIGHT, RENDER_WIDTH};
use super::shared_state::{BridgeError, SharedFrameBuffer, SharedLoadProgress, SharedPerfStats};

type Response = HttpResponse<Vec<u8>>;

const FRAME_WIDTH_HEADER: HeaderName = HeaderName::from_static("x-frame-width");
const FRAME_HEIGHT_HEADER: HeaderName = HeaderName::from_static("x-frame-height");

/// Shared state the protocol reads from
#[derive(Clone)]
pub struct ProtocolState {
    pub buffer: SharedFrameBuffer,
    pub perf_stats: SharedPerfStats,
    pub progress: SharedLoadProgress,
}

/// Handle requests to the custom `frame://` protocol
///
/// Supported endpoints:
/// - `frame` or `frame.jpg`: JPEG-compressed frame (~50-100KB)
/// - `frame.raw`: Raw RGBA frame (~1.8MB)
/// - `stats`: Performance statistics as JSON
/// - `progress`: Preload progress as JSON
pub fn handle_frame_protocol(uri_path: &str, state: &ProtocolState) -> Response {
    let resource = uri_path.trim_start_matches('/');

    debug!("[Protocol] Resolved resource: {}", resource);

    let result = match resource {
        "frame" | "frame.jpg" => handle_jpeg_frame(&state.buffer),
        "frame.raw" => handle_raw_frame(&state.buffer),
        "stats" => state.perf_stats.snapshot().map(|stats| json_response(&stats)),
        "progress" => state.progress.get().map(|progress| json_response(&progress)),
        _ => return text_response(StatusCode::NOT_FOUND, "Not Found"),
    };

    result.unwrap_or_else(|err| error_response(&err))
}

/// Handle JPEG-compressed frame request
fn handle_jpeg_frame(buffer: &SharedFrameBuffer) -> Result<Response, BridgeError> {
    let rgba_data = buffer.latest()?;
    let jpeg_data = encode_jpeg(&rgba_data, RENDER_WIDTH, RENDER_HEIGHT)?;
    Ok(frame_response("image/jpeg", jpeg_data))
}

/// Handle raw RGBA frame request
fn handle_raw_frame(buffer: &SharedFrameBuffer) -> Result<Response, BridgeError> {
    let rgba_data = buffer.latest()?;
    Ok(frame_response("application/octet-stream", rgba_data))
}

/// Compress RGBA to JPEG, dropping the alpha channel
fn encode_jpeg(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, BridgeError> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(BridgeError::FrameSize {
            expected,
            actual: rgba.len(),
        });
    }

    let rgb: Vec<u8> = rgba
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, JPEG_QUALITY).write_image(
        &rgb,
        width,
        height,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(jpeg_data)
}

fn frame_response(content_type: &'static str, body: Vec<u8>) -> Response {
    let mut response = base_response(StatusCode::OK, content_type, body);
    let headers = response.headers_mut();
    headers.insert(FRAME_WIDTH_HEADER, HeaderValue::from(RENDER_WIDTH));
    headers.insert(FRAME_HEIGHT_HEADER, HeaderValue::from(RENDER_HEIGHT));
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("X-Frame-Width, X-Frame-Height"),
    );
    response
}

fn json_response<T: Serialize>(value: &T) -> Response {
    let json = serde_json::to_vec(value).unwrap_or_default();
    base_response(StatusCode::OK, "application/json", json)
}

fn text_response(status: StatusCode, text: &str) -> Response {
    base_response(status, "text/plain", text.as_bytes().to_vec())
}

fn error_response(err: &BridgeError) -> Response {
    match err {
        BridgeError::FrameNotReady => text_response(StatusCode::SERVICE_UNAVAILABLE, "Frame not ready"),
        other => {
            warn!("[Protocol] Request failed: {}", other);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string())
        }
    }
}

fn base_response(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Response {
    let mut response = HttpResponse::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tauri_bridge::shared_state::LoadProgress;

    fn state() -> ProtocolState {
        ProtocolState {
            buffer: SharedFrameBuffer::default(),
            perf_stats: SharedPerfStats::default(),
            progress: SharedLoadProgress::default(),
        }
    }

    #[test]
    fn frame_before_first_render_is_unavailable() {
        let state = state();
        assert_eq!(handle_frame_protocol("/frame", &state).status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(handle_frame_protocol("/frame.raw", &state).status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn unknown_resource_is_not_found() {
        assert_eq!(handle_frame_protocol("/nope", &state()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn raw_frame_carries_dimensions() {
        let state = state();
        let frame = vec![7u8; (RENDER_WIDTH * RENDER_HEIGHT * 4) as usize];
        state.buffer.publish(frame.clone()).unwrap();

        let response = handle_frame_protocol("frame.raw", &state);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-width"], RENDER_WIDTH.to_string().as_str());
        assert_eq!(response.body().len(), frame.len());
    }

    #[test]
    fn jpeg_frame_is_encoded() {
        let state = state();
        state
            .buffer
            .publish(vec![128u8; (RENDER_WIDTH * RENDER_HEIGHT * 4) as usize])
            .unwrap();

        let response = handle_frame_protocol("/frame.jpg", &state);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/jpeg");
        // JPEG SOI marker
        assert_eq!(&response.body()[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn truncated_frame_is_a_server_error() {
        let state = state();
        state.buffer.publish(vec![0u8; 16]).unwrap();
        assert_eq!(
            handle_frame_protocol("/frame", &state).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn progress_is_served_as_json() {
        let state = state();
        state
            .progress
            .set(LoadProgress {
                percent: 40.0,
                loaded_assets: 2,
                total_assets: 5,
                ready: false,
                failed: None,
            })
            .unwrap();

        let response = handle_frame_protocol("/progress", &state);
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(json["total_assets"], 5);
        assert_eq!(json["percent"], 40.0);
    }
}
