//! Builds the packet stream a peer sends to transfer one firmware image,
//! and the length-prefixed container the `dfu-flash` tool stores it in.

use bootloader_core::{crc16_ccitt, MAX_DATA_PAYLOAD, MAX_IMAGE_BYTES};
use thiserror::Error;

/// Default DATA payload length per packet.
pub const DEFAULT_CHUNK_LEN: usize = 128;

/// Failures while building or decoding a packet stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The input image holds no bytes.
    #[error("image is empty")]
    EmptyImage,
    /// The input image exceeds the application window.
    #[error("image is {size} bytes; the application window holds {max}", max = MAX_IMAGE_BYTES)]
    ImageTooLarge {
        /// Size of the rejected image.
        size: usize,
    },
    /// The requested chunk length cannot be carried by a DATA packet.
    #[error("chunk length {len} is outside 1..={max}", max = MAX_DATA_PAYLOAD)]
    InvalidChunkLen {
        /// The rejected chunk length.
        len: usize,
    },
    /// A container frame ran past the end of the input.
    #[error("container frame at byte {offset} is truncated")]
    TruncatedFrame {
        /// Byte offset of the malformed frame header.
        offset: usize,
    },
}

/// Returns the sequence number following `sequence`, wrapping 255 -> 1.
#[must_use]
pub const fn next_sequence(sequence: u8) -> u8 {
    if sequence == u8::MAX {
        1
    } else {
        sequence + 1
    }
}

/// Builds the full packet stream for one image: START_SESSION carrying the
/// image size and CRC, in-order DATA chunks, then END_SESSION.
///
/// # Errors
///
/// Returns a [`StreamError`] when the image is empty or oversized, or when
/// `chunk_len` does not fit a DATA payload.
pub fn build_stream(image: &[u8], chunk_len: usize) -> Result<Vec<Vec<u8>>, StreamError> {
    if image.is_empty() {
        return Err(StreamError::EmptyImage);
    }
    if image.len() > MAX_IMAGE_BYTES as usize {
        return Err(StreamError::ImageTooLarge { size: image.len() });
    }
    if chunk_len == 0 || chunk_len > MAX_DATA_PAYLOAD {
        return Err(StreamError::InvalidChunkLen { len: chunk_len });
    }

    let mut frames = Vec::with_capacity(2 + image.len().div_ceil(chunk_len));

    let mut start = vec![0x00, 0x01];
    #[allow(clippy::cast_possible_truncation)]
    start.extend_from_slice(&(image.len() as u32).to_be_bytes());
    start.extend_from_slice(&crc16_ccitt(image).to_be_bytes());
    frames.push(start);

    let mut sequence = 1_u8;
    for chunk in image.chunks(chunk_len) {
        let mut frame = Vec::with_capacity(2 + chunk.len());
        frame.push(sequence);
        frame.push(0x02);
        frame.extend_from_slice(chunk);
        frames.push(frame);
        sequence = next_sequence(sequence);
    }

    frames.push(vec![0x00, 0x03]);
    Ok(frames)
}

/// Serialises a packet stream into the container format: each frame prefixed
/// with its big-endian u16 length.
#[must_use]
pub fn encode_stream(frames: &[Vec<u8>]) -> Vec<u8> {
    let total: usize = frames.iter().map(|frame| 2 + frame.len()).sum();
    let mut container = Vec::with_capacity(total);
    for frame in frames {
        #[allow(clippy::cast_possible_truncation)]
        container.extend_from_slice(&(frame.len() as u16).to_be_bytes());
        container.extend_from_slice(frame);
    }
    container
}

/// Parses a container back into its packet frames.
///
/// # Errors
///
/// Returns [`StreamError::TruncatedFrame`] when a length prefix or frame
/// body runs past the end of the input.
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<Vec<u8>>, StreamError> {
    let mut frames = Vec::new();
    let mut offset = 0_usize;

    while offset < bytes.len() {
        let header = bytes
            .get(offset..offset + 2)
            .ok_or(StreamError::TruncatedFrame { offset })?;
        let len = usize::from(u16::from_be_bytes([header[0], header[1]]));
        let body = bytes
            .get(offset + 2..offset + 2 + len)
            .ok_or(StreamError::TruncatedFrame { offset })?;
        frames.push(body.to_vec());
        offset += 2 + len;
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::{
        build_stream, decode_stream, encode_stream, next_sequence, StreamError, DEFAULT_CHUNK_LEN,
    };
    use bootloader_core::{crc16_ccitt, MAX_DATA_PAYLOAD};

    #[test]
    fn stream_opens_with_size_and_crc_and_closes_the_session() {
        let image = [0xC3_u8; 300];
        let frames = build_stream(&image, DEFAULT_CHUNK_LEN).expect("valid image");

        assert_eq!(frames.len(), 2 + 3);

        let start = &frames[0];
        assert_eq!(&start[..2], &[0x00, 0x01]);
        assert_eq!(u32::from_be_bytes([start[2], start[3], start[4], start[5]]), 300);
        assert_eq!(
            u16::from_be_bytes([start[6], start[7]]),
            crc16_ccitt(&image)
        );

        assert_eq!(frames.last().expect("end frame"), &vec![0x00, 0x03]);
    }

    #[test]
    fn data_chunks_carry_consecutive_sequence_numbers() {
        let image = [0x11_u8; 500];
        let frames = build_stream(&image, 100).expect("valid image");

        let data_frames = &frames[1..frames.len() - 1];
        assert_eq!(data_frames.len(), 5);
        for (index, frame) in data_frames.iter().enumerate() {
            assert_eq!(frame[0], u8::try_from(index + 1).unwrap());
            assert_eq!(frame[1], 0x02);
            assert_eq!(frame.len(), 102);
        }
    }

    #[test]
    fn sequence_numbers_wrap_without_reusing_zero() {
        assert_eq!(next_sequence(1), 2);
        assert_eq!(next_sequence(254), 255);
        assert_eq!(next_sequence(255), 1);

        let image = vec![0x22_u8; 300];
        let frames = build_stream(&image, 1).expect("single-byte chunks");
        let data_frames = &frames[1..frames.len() - 1];
        assert_eq!(data_frames.len(), 300);
        assert_eq!(data_frames[254][0], 255);
        assert_eq!(data_frames[255][0], 1);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert_eq!(build_stream(&[], 64), Err(StreamError::EmptyImage));
        assert_eq!(
            build_stream(&[0x00], 0),
            Err(StreamError::InvalidChunkLen { len: 0 })
        );
        assert_eq!(
            build_stream(&[0x00], MAX_DATA_PAYLOAD + 1),
            Err(StreamError::InvalidChunkLen {
                len: MAX_DATA_PAYLOAD + 1
            })
        );
    }

    #[test]
    fn container_round_trips_every_frame() {
        let image = [0x44_u8; 513];
        let frames = build_stream(&image, DEFAULT_CHUNK_LEN).expect("valid image");

        let container = encode_stream(&frames);
        let decoded = decode_stream(&container).expect("well-formed container");

        assert_eq!(decoded, frames);
    }

    #[test]
    fn truncated_containers_name_the_bad_offset() {
        let frames = vec![vec![0x00, 0x05]];
        let mut container = encode_stream(&frames);
        container.pop();

        assert_eq!(
            decode_stream(&container),
            Err(StreamError::TruncatedFrame { offset: 0 })
        );

        assert_eq!(
            decode_stream(&[0x00]),
            Err(StreamError::TruncatedFrame { offset: 0 })
        );
    }
}
