//! Frame capture: pulls the latest rendered frame from a sink and
//! normalizes the buffer layout.
//!
//! Raw output format is fixed: RGBA8888, 4 bytes per pixel, row-major,
//! top-left origin, exactly `width * height * 4` bytes. Sinks may hand back
//! buffers with padded rows (`row_stride > width * pixel_stride`); padding
//! is stripped row-by-row. Encoded capture produces PNG.

use thiserror::Error;

use super::surface::{FrameSink, SinkFrame};

/// Error type for capture operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The sink has no frame yet. Frames lag rendering, so this is a
    /// normal, retryable condition rather than a surface failure.
    #[error("no frame available from the surface")]
    NoFrameAvailable,

    /// PNG encoding failed.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
}

/// Captures the latest frame from `sink` as raw RGBA bytes.
///
/// # Errors
///
/// Returns [`CaptureError::NoFrameAvailable`] when the sink is empty.
pub fn capture_raw(sink: &dyn FrameSink) -> Result<Vec<u8>, CaptureError> {
    let frame = sink
        .acquire_latest_frame()
        .ok_or(CaptureError::NoFrameAvailable)?;
    Ok(strip_row_padding(&frame))
}

/// Captures the latest frame from `sink` as PNG bytes.
///
/// # Errors
///
/// Returns [`CaptureError::NoFrameAvailable`] when the sink is empty, or
/// [`CaptureError::Encode`] if PNG encoding fails.
pub fn capture_png(sink: &dyn FrameSink) -> Result<Vec<u8>, CaptureError> {
    let frame = sink
        .acquire_latest_frame()
        .ok_or(CaptureError::NoFrameAvailable)?;
    encode_png(&frame)
}

/// Copies a frame into a tightly-packed RGBA buffer.
///
/// When the row stride already matches the pixel width this is a single bulk
/// copy; otherwise each row is copied at its true width, dropping the
/// padding bytes at the end of every row.
pub fn strip_row_padding(frame: &SinkFrame) -> Vec<u8> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let row_bytes = width * frame.pixel_stride;

    if frame.row_stride == row_bytes {
        return frame.data[..row_bytes * height].to_vec();
    }

    let mut packed = Vec::with_capacity(row_bytes * height);
    for row in 0..height {
        let start = row * frame.row_stride;
        packed.extend_from_slice(&frame.data[start..start + row_bytes]);
    }
    packed
}

/// Encodes a frame as PNG, stripping row padding first.
///
/// # Errors
///
/// Returns [`CaptureError::Encode`] if the encoder rejects the buffer.
pub fn encode_png(frame: &SinkFrame) -> Result<Vec<u8>, CaptureError> {
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    let packed = strip_row_padding(frame);
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        &packed,
        frame.width,
        frame.height,
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::surface::headless::MemoryFrameSink;

    /// A frame whose pixel bytes are a recognizable ramp, with optional row
    /// padding filled with 0xEE marker bytes.
    fn ramp_frame(width: u32, height: u32, padding: usize) -> SinkFrame {
        let pixel_stride = 4;
        let row_bytes = width as usize * pixel_stride;
        let row_stride = row_bytes + padding;
        let mut data = vec![0xEE; row_stride * height as usize];
        for row in 0..height as usize {
            for col in 0..row_bytes {
                data[row * row_stride + col] = (row * 31 + col) as u8;
            }
        }
        SinkFrame {
            width,
            height,
            pixel_stride,
            row_stride,
            data,
        }
    }

    #[test]
    fn test_tight_frame_copies_in_bulk() {
        let frame = ramp_frame(8, 4, 0);
        let packed = strip_row_padding(&frame);
        assert_eq!(packed, frame.data);
        assert_eq!(packed.len(), 8 * 4 * 4);
    }

    #[test]
    fn test_padded_frame_drops_padding_bytes() {
        let frame = ramp_frame(8, 4, 12);
        let packed = strip_row_padding(&frame);

        assert_eq!(packed.len(), 8 * 4 * 4);
        assert!(
            packed.iter().all(|&b| b != 0xEE),
            "padding marker bytes must not survive normalization"
        );
        // Row contents match the unpadded region of each source row.
        let row_bytes = 8 * 4;
        for row in 0..4 {
            let src = &frame.data[row * frame.row_stride..row * frame.row_stride + row_bytes];
            let dst = &packed[row * row_bytes..(row + 1) * row_bytes];
            assert_eq!(src, dst, "row {row}");
        }
    }

    #[test]
    fn test_padded_and_tight_frames_normalize_identically() {
        let tight = ramp_frame(16, 3, 0);
        let mut padded = ramp_frame(16, 3, 8);
        // Give the padded frame the same pixel content as the tight one.
        let row_bytes = 16 * 4;
        for row in 0..3 {
            let src = &tight.data[row * tight.row_stride..row * tight.row_stride + row_bytes];
            padded.data[row * padded.row_stride..row * padded.row_stride + row_bytes]
                .copy_from_slice(src);
        }

        assert_eq!(strip_row_padding(&tight), strip_row_padding(&padded));
    }

    #[test]
    fn test_raw_capture_length_is_width_height_4() {
        let sink = MemoryFrameSink::seeded(800, 600);
        let raw = capture_raw(&sink).expect("capture");
        assert_eq!(raw.len(), 800 * 600 * 4);
    }

    #[test]
    fn test_empty_sink_reports_no_frame_available() {
        let sink = MemoryFrameSink::new();
        assert!(matches!(
            capture_raw(&sink),
            Err(CaptureError::NoFrameAvailable)
        ));
        assert!(matches!(
            capture_png(&sink),
            Err(CaptureError::NoFrameAvailable)
        ));
    }

    #[test]
    fn test_png_capture_produces_png_magic() {
        let sink = MemoryFrameSink::seeded(32, 32);
        let png = capture_png(&sink).expect("capture");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_png_capture_of_padded_frame_encodes_true_width() {
        let sink = MemoryFrameSink::new();
        sink.push_frame(ramp_frame(8, 4, 12));
        let png = capture_png(&sink).expect("capture");
        // PNG IHDR: width at offset 16, height at offset 20 (big-endian).
        let width = u32::from_be_bytes(png[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(png[20..24].try_into().unwrap());
        assert_eq!((width, height), (8, 4));
    }
}
