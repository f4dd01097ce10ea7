//! Upstream mGBA states wrapped in PNG screenshots.
//!
//! Upstream builds can save a state as a PNG of the screen with the state
//! in private chunks: `gbAs` holds the zlib-compressed main state and each
//! `gbAx` holds one extdata item as `tag: u32 LE`, `size: u32 LE`, then
//! zlib data. Only the savedata item is carried over. The result is the
//! plain state followed by an extdata table, which the engine loads as is.

use std::io::Read;

use flate2::read::ZlibDecoder;
use thiserror::Error;

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Extdata tag for save data.
pub const EXTDATA_SAVEDATA: i32 = 2;

/// Size of one extdata header: tag i32, size i32, offset i64.
pub const EXTDATA_HEADER_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum PngStateError {
    #[error("PNG chunk at offset {0} runs past the end of the file")]
    Truncated(usize),
    #[error("PNG carries no gbAs state chunk")]
    MissingState,
    #[error("failed to inflate {chunk} chunk: {source}")]
    Inflate {
        chunk: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("extdata item of {0} bytes does not fit the header")]
    Oversized(usize),
}

/// True if `data` starts with the PNG signature.
#[must_use]
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

struct Chunk<'a> {
    kind: [u8; 4],
    data: &'a [u8],
}

fn next_chunk(data: &[u8], offset: usize) -> Result<Option<(Chunk<'_>, usize)>, PngStateError> {
    if offset == data.len() {
        return Ok(None);
    }
    let header = data
        .get(offset..offset + 8)
        .ok_or(PngStateError::Truncated(offset))?;
    let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let kind = [header[4], header[5], header[6], header[7]];
    let body = offset + 8;
    let chunk_data = data
        .get(body..body + len)
        .ok_or(PngStateError::Truncated(offset))?;
    // Data plus the trailing CRC.
    Ok(Some((Chunk { kind, data: chunk_data }, body + len + 4)))
}

fn inflate(chunk: &'static str, compressed: &[u8]) -> Result<Vec<u8>, PngStateError> {
    let mut out = Vec::new();
    ZlibDecoder::new(compressed)
        .read_to_end(&mut out)
        .map_err(|source| PngStateError::Inflate { chunk, source })?;
    Ok(out)
}

/// Extract a loadable state from a PNG-wrapped upstream state.
pub fn unwrap_png_state(png: &[u8]) -> Result<Vec<u8>, PngStateError> {
    let mut main = None;
    let mut extra = None;
    let mut offset = PNG_SIGNATURE.len().min(png.len());

    while main.is_none() || extra.is_none() {
        let Some((chunk, next)) = next_chunk(png, offset)? else {
            break;
        };
        match &chunk.kind {
            b"gbAs" if main.is_none() => main = Some(inflate("gbAs", chunk.data)?),
            b"gbAx" if extra.is_none() && chunk.data.len() >= 8 => {
                let tag = i32::from_le_bytes([chunk.data[0], chunk.data[1], chunk.data[2], chunk.data[3]]);
                if tag == EXTDATA_SAVEDATA {
                    extra = Some(inflate("gbAx", &chunk.data[8..])?);
                }
            }
            b"IEND" => break,
            _ => {}
        }
        offset = next;
    }

    let main = main.ok_or(PngStateError::MissingState)?;
    let mut state = Vec::with_capacity(main.len() + 2 * EXTDATA_HEADER_LEN);
    state.extend_from_slice(&main);
    if let Some(extra) = extra {
        let size = i32::try_from(extra.len()).map_err(|_| PngStateError::Oversized(extra.len()))?;
        let data_offset = (main.len() + EXTDATA_HEADER_LEN) as i64;
        state.extend_from_slice(&EXTDATA_SAVEDATA.to_le_bytes());
        state.extend_from_slice(&size.to_le_bytes());
        state.extend_from_slice(&data_offset.to_le_bytes());
        state.extend_from_slice(&extra);
    }
    state.extend_from_slice(&[0; EXTDATA_HEADER_LEN]);
    Ok(state)
}
