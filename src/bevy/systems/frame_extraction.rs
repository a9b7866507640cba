//! Frame extraction system
//!
//! This module handles pulling rendered frames out of the render world and
//! publishing them for the Tauri frontend.

use bevy::{
    log::{info, warn},
    prelude::*,
    render::renderer::RenderDevice,
    time::Time,
};

use crate::bevy::resources::{
    FrameBufferRes, FrameCount, FrameRateLimiter, FrameTimings, MainWorldReceiver, PerfStatsRes,
    PreRollFrames,
};
use crate::config::{performance::*, RENDER_HEIGHT, RENDER_WIDTH};

/// Extract the newest frame from the render pipeline and publish it
pub fn extract_and_process_frame(
    receiver: Res<MainWorldReceiver>,
    buffer: Option<Res<FrameBufferRes>>,
    perf_stats: Option<Res<PerfStatsRes>>,
    mut count: ResMut<FrameCount>,
    mut pre_roll: ResMut<PreRollFrames>,
    mut timings: ResMut<FrameTimings>,
    mut frame_limiter: ResMut<FrameRateLimiter>,
    time: Res<Time>,
) {
    let Some(buffer) = buffer else { return };

    // Let the pipeline warm up before publishing anything
    if pre_roll.0 > 0 {
        while receiver.try_recv().is_ok() {}
        pre_roll.0 -= 1;
        if pre_roll.0 == 0 {
            info!("[Bevy] Pre-roll finished, publishing frames");
        }
        return;
    }

    let now = std::time::Instant::now();
    if now.duration_since(frame_limiter.last_frame_time) < frame_limiter.min_frame_interval {
        while receiver.try_recv().is_ok() {}
        return;
    }
    frame_limiter.last_frame_time = now;

    let frame_start = std::time::Instant::now();

    // Only the newest frame matters
    let receive_start = std::time::Instant::now();
    let Some(image_data) = receiver.try_iter().last() else {
        return;
    };
    let receive_time = receive_start.elapsed().as_secs_f64() * 1000.0;

    let process_start = std::time::Instant::now();
    let Some(rgba) = remove_row_padding(&image_data, RENDER_WIDTH, RENDER_HEIGHT) else {
        return;
    };
    let process_time = process_start.elapsed().as_secs_f64() * 1000.0;
    let data_size_kb = rgba.len() as f64 / 1024.0;

    if let Err(err) = buffer.0.publish(rgba) {
        warn!("[Bevy] Dropping frame: {}", err);
        return;
    }
    count.0 += 1;

    let total_time = frame_start.elapsed().as_secs_f64() * 1000.0;
    timings.frame_times.push(total_time);
    if timings.frame_times.len() > FRAME_TIMING_SAMPLES {
        timings.frame_times.remove(0);
    }
    let avg_time = average(&timings.frame_times);

    if let Some(perf_res) = &perf_stats {
        if let Ok(mut stats) = perf_res.0 .0.lock() {
            stats.gpu_transfer_ms = receive_time;
            stats.data_processing_ms = process_time;
            stats.frame_encoding_ms = total_time;
            stats.frame_count = count.0;
            stats.data_size_kb = data_size_kb;
            stats.bevy_fps = if avg_time > 0.0 { 1000.0 / avg_time } else { 0.0 };
        }
    }

    let current_time = time.elapsed_secs_f64();
    if current_time - timings.last_print_time >= STATS_PRINT_INTERVAL {
        let max_time = timings.frame_times.iter().cloned().fold(0.0f64, f64::max);
        let min_time = timings.frame_times.iter().cloned().fold(f64::MAX, f64::min);

        info!(
            "[Bevy] Frame {} | Receive: {:.2}ms | Process: {:.2}ms | Total: {:.2}ms | Avg: {:.2}ms (Min: {:.2}ms, Max: {:.2}ms) | Size: {:.1}KB",
            count.0,
            receive_time,
            process_time,
            total_time,
            avg_time,
            min_time,
            max_time,
            data_size_kb
        );
        timings.last_print_time = current_time;
    }
}

fn average(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

/// Remove GPU buffer row padding alignment, returning pure RGBA data
fn remove_row_padding(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    if data.is_empty() {
        return None;
    }

    let row_bytes = width as usize * 4;
    let aligned_row_bytes = RenderDevice::align_copy_bytes_per_row(row_bytes);

    let rgba_data = if row_bytes == aligned_row_bytes {
        data.to_vec()
    } else {
        data.chunks(aligned_row_bytes)
            .take(height as usize)
            .flat_map(|row| &row[..row_bytes.min(row.len())])
            .cloned()
            .collect()
    };

    Some(rgba_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_data_yields_nothing() {
        assert!(remove_row_padding(&[], 4, 4).is_none());
    }

    #[test]
    fn padding_is_stripped_per_row() {
        // 10 px * 4 bytes = 40 bytes per row, padded to the copy alignment
        let width = 10;
        let height = 3;
        let aligned = RenderDevice::align_copy_bytes_per_row(40);
        assert!(aligned > 40);

        let mut data = Vec::new();
        for row in 0..height {
            data.extend(std::iter::repeat(row as u8 + 1).take(40));
            data.extend(std::iter::repeat(0xEE).take(aligned - 40));
        }

        let rgba = remove_row_padding(&data, width, height).unwrap();
        assert_eq!(rgba.len(), 40 * height as usize);
        assert!(!rgba.contains(&0xEE));
        assert_eq!(rgba[40], 2);
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[2.0, 4.0]), 3.0);
    }
}
