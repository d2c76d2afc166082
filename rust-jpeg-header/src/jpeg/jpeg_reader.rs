use byteorder::{BigEndian, ReadBytesExt};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::io::{self, ErrorKind, Read};

use crate::error::{Error, Result};

/// Marker tags, the byte following 0xFF.
#[derive(PartialEq, Eq, FromPrimitive, Debug, Clone, Copy)]
pub enum JPEGMarker {
    SOF0 = 0xC0, // Baseline DCT, the only frame type decoded
    SOF1 = 0xC1,
    SOF2 = 0xC2,
    SOF3 = 0xC3,
    DHT = 0xC4,
    SOF5 = 0xC5,
    SOF6 = 0xC6,
    SOF7 = 0xC7,
    JPG = 0xC8,
    SOF9 = 0xC9,
    SOF10 = 0xCA,
    SOF11 = 0xCB,
    DAC = 0xCC,
    SOF13 = 0xCD,
    SOF14 = 0xCE,
    SOF15 = 0xCF,

    RST0 = 0xD0,
    RST1 = 0xD1,
    RST2 = 0xD2,
    RST3 = 0xD3,
    RST4 = 0xD4,
    RST5 = 0xD5,
    RST6 = 0xD6,
    RST7 = 0xD7,

    SOI = 0xD8,
    EOI = 0xD9,
    SOS = 0xDA,
    DQT = 0xDB,
    DNL = 0xDC,
    DRI = 0xDD,
    DHP = 0xDE,
    EXP = 0xDF,

    APP0 = 0xE0,
    APP1 = 0xE1,
    APP2 = 0xE2,
    APP3 = 0xE3,
    APP4 = 0xE4,
    APP5 = 0xE5,
    APP6 = 0xE6,
    APP7 = 0xE7,
    APP8 = 0xE8,
    APP9 = 0xE9,
    APP10 = 0xEA,
    APP11 = 0xEB,
    APP12 = 0xEC,
    APP13 = 0xED,
    APP14 = 0xEE,
    APP15 = 0xEF,

    JPG0 = 0xF0,
    JPG1 = 0xF1,
    JPG2 = 0xF2,
    JPG3 = 0xF3,
    JPG4 = 0xF4,
    JPG5 = 0xF5,
    JPG6 = 0xF6,
    JPG7 = 0xF7,
    JPG8 = 0xF8,
    JPG9 = 0xF9,
    JPG10 = 0xFA,
    JPG11 = 0xFB,
    JPG12 = 0xFC,
    JPG13 = 0xFD,

    COM = 0xFE,
    TEM = 0x01,
}

impl JPEGMarker {
    pub fn from_tag(tag: u8) -> Option<Self> {
        FromPrimitive::from_u8(tag)
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    // Enum variants can't be matched as ranges, so these go through the tag byte.
    pub fn is_application(self) -> bool {
        matches!(self.tag(), 0xE0..=0xEF)
    }

    pub fn is_restart(self) -> bool {
        matches!(self.tag(), 0xD0..=0xD7)
    }

    /// Start of frame markers for every coding process except baseline.
    pub fn is_unsupported_frame(self) -> bool {
        matches!(
            self,
            JPEGMarker::SOF1
                | JPEGMarker::SOF2
                | JPEGMarker::SOF3
                | JPEGMarker::SOF5
                | JPEGMarker::SOF6
                | JPEGMarker::SOF7
                | JPEGMarker::SOF9
                | JPEGMarker::SOF10
                | JPEGMarker::SOF11
                | JPEGMarker::SOF13
                | JPEGMarker::SOF14
                | JPEGMarker::SOF15
        )
    }

    /// Whether a 2 byte length field follows the marker.
    pub fn has_length(self) -> bool {
        !(self.is_restart()
            || matches!(self, JPEGMarker::SOI | JPEGMarker::EOI | JPEGMarker::TEM))
    }
}

/// Forward-only reader over a JPEG byte source that keeps track of its offset.
pub struct JPEGReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> JPEGReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    pub fn read_next_byte(&mut self) -> Result<u8> {
        let value = self.inner.read_u8()?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_next_word(&mut self) -> Result<u16> {
        let value = self.inner.read_u16::<BigEndian>()?;
        self.position += 2;
        Ok(value)
    }

    /// Like `read_next_byte`, but running out of input is not an error.
    fn read_optional_byte(&mut self) -> Result<Option<u8>> {
        match self.inner.read_u8() {
            Ok(value) => {
                self.position += 1;
                Ok(Some(value))
            }
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Checks that the source starts with the SOI marker.
    pub fn read_signature(&mut self) -> Result<()> {
        let first = self.read_next_byte()?;
        let second = self.read_next_byte()?;
        if first != 0xFF || second != JPEGMarker::SOI.tag() {
            return Err(Error::InvalidSignature(first, second));
        }
        Ok(())
    }

    /// Reads the next `0xFF <tag>` pair and returns the tag.
    ///
    /// Returns `None` when the source ends exactly at a marker boundary. Fill
    /// bytes (extra 0xFF) in front of the tag are skipped.
    pub fn read_marker(&mut self) -> Result<Option<u8>> {
        let prefix = match self.read_optional_byte()? {
            Some(prefix) => prefix,
            None => return Ok(None),
        };
        if prefix != 0xFF {
            return Err(Error::MalformedMarkerStream(prefix));
        }

        let mut tag = self.read_next_byte()?;
        while tag == 0xFF {
            tag = self.read_next_byte()?;
        }
        Ok(Some(tag))
    }

    /// Reads a segment length field, which counts its own two bytes.
    pub fn read_segment_length(&mut self) -> Result<u16> {
        let length = self.read_next_word()?;
        if length < 2 {
            return Err(Error::InvalidSegmentLength(length));
        }
        Ok(length)
    }

    /// Discards exactly `count` bytes.
    pub fn skip_bytes(&mut self, count: u64) -> Result<()> {
        let skipped = io::copy(&mut self.inner.by_ref().take(count), &mut io::sink())?;
        self.position += skipped;
        if skipped != count {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("input ended after {skipped} of {count} bytes"),
            )
            .into());
        }
        Ok(())
    }

    /// Skips a length-prefixed segment body without looking at it. Returns the
    /// declared length.
    pub fn skip_segment(&mut self) -> Result<u16> {
        let length = self.read_segment_length()?;
        self.skip_bytes(u64::from(length - 2))?;
        log::trace!("jpeg: skipped {} segment bytes", length - 2);
        Ok(length)
    }

    /// Steps over entropy-coded scan data and returns the tag of the marker
    /// that ends it, or `None` if the input ends first.
    ///
    /// Stuffed zero bytes and restart markers belong to the scan and do not
    /// end it.
    pub fn skip_entropy_coded_data(&mut self) -> Result<Option<u8>> {
        let start = self.position;
        loop {
            match self.read_optional_byte()? {
                Some(0xFF) => {}
                Some(_) => continue,
                None => return Ok(None),
            }

            let mut tag = match self.read_optional_byte()? {
                Some(tag) => tag,
                None => return Ok(None),
            };
            while tag == 0xFF {
                tag = match self.read_optional_byte()? {
                    Some(tag) => tag,
                    None => return Ok(None),
                };
            }

            match tag {
                0x00 | 0xD0..=0xD7 => continue,
                _ => {
                    log::trace!(
                        "jpeg: skipped {} bytes of scan data",
                        self.position - start - 2
                    );
                    return Ok(Some(tag));
                }
            }
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    static TEST_HEADER: [u8; 28] = [
        0xFF, 0xD8, // Start of image
        0xFF, 0xC0, // Start of frame
        0, 17,          // Length
        8,              // Precision
        0, 128,         // Height
        0, 128,         // Width
        3,              // Component count
        1, 0x11, 0,
        2, 0x11, 1,
        3, 0x11, 1,     // Component data
        0xFF, 0xFE, // Comment
        0, 3,           // Length
        65,             // Content
        0xFF, 0xD9  // End of image
    ];

    #[test]
    fn read_words() {
        let mut reader = JPEGReader::new(&TEST_HEADER[..]);
        assert_eq!(reader.read_next_byte().unwrap(), 0xFF);
        assert_eq!(reader.read_next_byte().unwrap(), 0xD8);

        assert_eq!(reader.read_next_word().unwrap(), 0xFFC0);
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn read_markers() {
        let mut reader = JPEGReader::new(&TEST_HEADER[..]);
        reader.read_signature().unwrap();
        assert_eq!(reader.read_marker().unwrap(), Some(JPEGMarker::SOF0.tag()));
        assert_eq!(reader.skip_segment().unwrap(), 17);
        assert_eq!(reader.read_marker().unwrap(), Some(JPEGMarker::COM.tag()));
        assert_eq!(reader.skip_segment().unwrap(), 3);
        assert_eq!(reader.read_marker().unwrap(), Some(JPEGMarker::EOI.tag()));
        assert_eq!(reader.read_marker().unwrap(), None);
    }

    #[test]
    fn signature() {
        let mut reader = JPEGReader::new(&[0xFF, 0xD8][..]);
        assert!(reader.read_signature().is_ok());

        let mut reader = JPEGReader::new(&[0x89, 0x50][..]);
        assert!(matches!(
            reader.read_signature(),
            Err(Error::InvalidSignature(0x89, 0x50))
        ));

        let mut reader = JPEGReader::new(&[0xFF, 0xD9][..]);
        assert!(matches!(
            reader.read_signature(),
            Err(Error::InvalidSignature(0xFF, 0xD9))
        ));

        let mut reader = JPEGReader::new(&[0xFF][..]);
        assert!(matches!(reader.read_signature(), Err(Error::Io(_))));
    }

    #[test]
    fn marker_without_prefix() {
        let mut reader = JPEGReader::new(&[0x12, 0xDB][..]);
        assert!(matches!(
            reader.read_marker(),
            Err(Error::MalformedMarkerStream(0x12))
        ));
    }

    #[test]
    fn marker_fill_bytes() {
        let mut reader = JPEGReader::new(&[0xFF, 0xFF, 0xFF, 0xDB][..]);
        assert_eq!(reader.read_marker().unwrap(), Some(0xDB));
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn truncated_marker() {
        let mut reader = JPEGReader::new(&[0xFF][..]);
        assert!(matches!(reader.read_marker(), Err(Error::Io(_))));
    }

    #[test]
    fn skip_past_end() {
        // Declares 16 bytes but only 3 follow
        let mut reader = JPEGReader::new(&[0x00, 0x10, 1, 2, 3][..]);
        assert!(matches!(reader.skip_segment(), Err(Error::Io(_))));
        assert_eq!(reader.position(), 5);
    }

    #[test]
    fn segment_length_too_short() {
        let mut reader = JPEGReader::new(&[0x00, 0x01][..]);
        assert!(matches!(
            reader.skip_segment(),
            Err(Error::InvalidSegmentLength(1))
        ));
    }

    #[test]
    fn entropy_coded_data() {
        #[rustfmt::skip]
        let data = [
            0x12, 0xFF, 0x00, 0x34, // Stuffed byte
            0xFF, 0xD3, 0x56,       // Restart marker
            0xFF, 0xFF, 0xD9,       // Fill byte then EOI
        ];
        let mut reader = JPEGReader::new(&data[..]);
        assert_eq!(reader.skip_entropy_coded_data().unwrap(), Some(0xD9));
        assert_eq!(reader.position(), data.len() as u64);

        let mut reader = JPEGReader::new(&[0x12, 0x34, 0xFF][..]);
        assert_eq!(reader.skip_entropy_coded_data().unwrap(), None);
    }

    #[test]
    fn marker_classes() {
        assert_eq!(JPEGMarker::from_tag(0xE1), Some(JPEGMarker::APP1));
        assert_eq!(JPEGMarker::from_tag(0x00), None);
        assert_eq!(JPEGMarker::from_tag(0x80), None);

        assert!(JPEGMarker::APP15.is_application());
        assert!(!JPEGMarker::COM.is_application());
        assert!(JPEGMarker::SOF2.is_unsupported_frame());
        assert!(!JPEGMarker::SOF0.is_unsupported_frame());
        assert!(!JPEGMarker::DHT.is_unsupported_frame());
        assert!(!JPEGMarker::RST4.has_length());
        assert!(!JPEGMarker::EOI.has_length());
        assert!(JPEGMarker::DRI.has_length());
    }
}
