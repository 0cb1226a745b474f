use anyhow::{bail, ensure, Context, Result};

/// Value of erased flash; also used to pad gaps and partial pages.
pub const ERASED: u8 = 0xFF;

/// A contiguous firmware image assembled from an Intel HEX file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    pub base_address: u32,
    pub data: Vec<u8>,
}

/// One flash page worth of data, always exactly `page_size` bytes long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub address: u32,
    pub data: Vec<u8>,
}

struct Record {
    address: u16,
    kind: u8,
    data: Vec<u8>,
}

impl FirmwareImage {
    /// Assemble an image from Intel HEX text.
    ///
    /// Supports record types:
    /// - 00: Data
    /// - 01: End of File
    /// - 02: Extended Segment Address
    /// - 03/05: Start address (ignored, meaningless for AVR flash)
    /// - 04: Extended Linear Address
    ///
    /// Gaps between data records are filled with [`ERASED`].
    pub fn from_hex(input: &str) -> Result<Self> {
        let mut chunks: Vec<(u32, Vec<u8>)> = Vec::new();
        let mut upper: u32 = 0;

        for (index, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let line_num = index + 1;
            let record = parse_record(line).with_context(|| format!("line {}", line_num))?;

            match record.kind {
                0x00 => chunks.push((upper + record.address as u32, record.data)),
                0x01 => break,
                0x02 | 0x04 => {
                    ensure!(
                        record.data.len() == 2,
                        "line {}: address record must carry 2 bytes",
                        line_num
                    );
                    let value = u16::from_be_bytes([record.data[0], record.data[1]]) as u32;
                    upper = if record.kind == 0x02 { value << 4 } else { value << 16 };
                }
                0x03 | 0x05 => {}
                other => bail!("line {}: unsupported record type 0x{:02X}", line_num, other),
            }
        }

        let (Some(start), Some(end)) = (
            chunks.iter().map(|(a, _)| *a).min(),
            chunks.iter().map(|(a, d)| a + d.len() as u32).max(),
        ) else {
            bail!("no data records in HEX file");
        };

        let mut data = vec![ERASED; (end - start) as usize];
        for (address, bytes) in &chunks {
            let offset = (address - start) as usize;
            data[offset..offset + bytes.len()].copy_from_slice(bytes);
        }

        Ok(Self {
            base_address: start,
            data,
        })
    }

    /// One past the last byte of the image.
    pub fn end_address(&self) -> u32 {
        self.base_address + self.data.len() as u32
    }

    /// Split into page-aligned pages, dropping pages with nothing but
    /// erased bytes in them.
    pub fn pages(&self, page_size: usize) -> Vec<Page> {
        let lead = self.base_address as usize % page_size;
        let start = self.base_address - lead as u32;

        let mut aligned = vec![ERASED; lead];
        aligned.extend_from_slice(&self.data);

        aligned
            .chunks(page_size)
            .enumerate()
            .filter(|(_, chunk)| chunk.iter().any(|&b| b != ERASED))
            .map(|(index, chunk)| {
                let mut data = chunk.to_vec();
                data.resize(page_size, ERASED);
                Page {
                    address: start + (index * page_size) as u32,
                    data,
                }
            })
            .collect()
    }
}

fn parse_record(line: &str) -> Result<Record> {
    let Some(hex) = line.strip_prefix(':') else {
        bail!("missing start code ':'");
    };
    let bytes = decode_hex_bytes(hex).context("invalid hex data")?;

    ensure!(bytes.len() >= 5, "record too short");
    let count = bytes[0] as usize;
    ensure!(
        bytes.len() == 5 + count,
        "expected {} data bytes, got {}",
        count,
        bytes.len() - 5
    );

    // Sum of all bytes including the checksum is 0 mod 256
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    ensure!(sum == 0, "checksum mismatch");

    Ok(Record {
        address: u16::from_be_bytes([bytes[1], bytes[2]]),
        kind: bytes[3],
        data: bytes[4..4 + count].to_vec(),
    })
}

fn decode_hex_bytes(hex: &str) -> Result<Vec<u8>> {
    ensure!(hex.len() % 2 == 0, "odd number of hex characters");
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .with_context(|| format!("invalid hex at position {}", i))
        })
        .collect()
}
